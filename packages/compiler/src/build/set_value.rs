//! Setter statement synthesis.
//!
//! Every binding that can be affected by a chain contributes one mutation
//! statement; a data point's `set` accessor runs all of them. The bound
//! expression is rewritten so the changed chain reads from the `value`
//! parameter and every other reference reads from `this.data`.

use crate::error::{CompileError, Result};
use crate::html::tags::BOOLEAN_ATTRIBUTES;
use crate::html::Tree;
use crate::js::{
    alias_variables, replace_variables, this_data_variable, Expr, Statement, UnaryOperator,
};
use crate::template::{Binding, BindingAspect, ChainSegment, NodeDataStore};

use super::{get_element, get_slice, style_key_to_camel};

/// The mutation statements one binding contributes to a chain's setter.
pub fn make_set_from_binding(
    binding: &Binding,
    node_data: &NodeDataStore,
    tree: &Tree,
    chain: &[ChainSegment],
    globals: &[String],
) -> Result<Vec<Statement>> {
    let nullable = node_data.is_nullable(binding.element);
    let element = get_element(binding.element, node_data, tree);

    let mut new_value = binding.expression.clone();
    let variable_reference = get_slice(chain);
    replace_variables(&mut new_value, &Expr::ident("value"), &[variable_reference]);
    let mut except = vec!["value".to_string()];
    except.extend(globals.iter().cloned());
    alias_variables(&mut new_value, &this_data_variable(), &except);

    let mut statements = Vec::new();
    match binding.aspect {
        BindingAspect::InnerText => {
            let fragment_index =
                binding
                    .fragment_index
                    .ok_or(CompileError::UnknownAspect {
                        aspect: "text binding without fragment index",
                    })?;
            if nullable {
                // The fragment may not be mounted, assign through the helper.
                let target = element
                    .optional_property("childNodes")
                    .index_number(fragment_index);
                statements.push(Statement::Expression(
                    Expr::ident("tryAssignData").call(vec![target, new_value]),
                ));
            } else {
                let target = element
                    .property("childNodes")
                    .index_number(fragment_index)
                    .property("data");
                statements.push(Statement::Expression(target.assign(new_value)));
            }
        }
        BindingAspect::Conditional => {
            let (identifier, method) = swap_targets(binding, node_data)?;
            statements.push(Statement::Expression(
                Expr::from_chain(["conditionalSwap", "call"]).call(vec![
                    Expr::ident("this"),
                    new_value,
                    Expr::string(identifier),
                    Expr::ident("this").property(method),
                ]),
            ));
        }
        BindingAspect::Iterator => {
            let (_, method) = swap_targets(binding, node_data)?;
            let rendered = Expr::ident("this")
                .property(method)
                .call(vec![Expr::ident("value")]);
            let append = if nullable {
                element.optional_property("append").optional_call(vec![rendered])
            } else {
                element.property("append").call(vec![rendered])
            };
            statements.push(Statement::Expression(append));
        }
        BindingAspect::Attribute => {
            let attribute =
                binding
                    .attribute
                    .as_deref()
                    .ok_or(CompileError::UnknownAspect {
                        aspect: "attribute binding without attribute name",
                    })?;
            if BOOLEAN_ATTRIBUTES.contains(attribute) {
                statements.push(Statement::Expression(
                    element.property(attribute).assign(new_value),
                ));
            } else {
                let set_attribute = if nullable {
                    element.optional_property("setAttribute")
                } else {
                    element.property("setAttribute")
                };
                let call = if nullable {
                    set_attribute.optional_call(vec![Expr::string(attribute), new_value])
                } else {
                    set_attribute.call(vec![Expr::string(attribute), new_value])
                };
                statements.push(Statement::Expression(call));
            }
        }
        BindingAspect::Data => {
            if nullable {
                statements.push(Statement::Expression(
                    Expr::ident("tryAssignData").call(vec![element, new_value]),
                ));
            } else if let Expr::ObjectLiteral(object) = &new_value {
                // `$data="{ count: value }"` narrows to a single child
                // property write instead of replacing the whole data object.
                let narrowed = object
                    .values
                    .iter()
                    .find(|(_, value)| matches!(value, Expr::Identifier(name) if name == "value"));
                match narrowed {
                    Some((property, value)) => statements.push(Statement::Expression(
                        element
                            .property("data")
                            .property(property.clone())
                            .assign(value.clone()),
                    )),
                    None => statements.push(Statement::Expression(
                        element.property("data").assign(new_value),
                    )),
                }
            } else {
                statements.push(Statement::Expression(
                    element.property("data").assign(new_value),
                ));
            }
        }
        BindingAspect::DocumentTitle => {
            statements.push(Statement::Expression(
                Expr::from_chain(["document", "title"]).assign(new_value),
            ));
        }
        BindingAspect::InnerHTML => {
            if nullable {
                statements.push(Statement::Expression(Expr::ident("tryAssignData").call(
                    vec![element, new_value, Expr::string("innerHTML")],
                )));
            } else {
                statements.push(Statement::Expression(
                    element.property("innerHTML").assign(new_value),
                ));
            }
        }
        BindingAspect::Style => {
            let key = style_key_to_camel(binding.style_key.as_deref().ok_or(
                CompileError::UnknownAspect {
                    aspect: "style binding without style key",
                },
            )?);
            statements.push(Statement::Expression(
                element.property("style").property(key).assign(new_value),
            ));
        }
        BindingAspect::SetHook => {
            let method = match &binding.expression {
                Expr::Identifier(name) => name.clone(),
                _ => {
                    return Err(CompileError::NotImplemented {
                        construct: "non-identifier set hook callback",
                    })
                }
            };
            statements.push(Statement::Expression(
                Expr::ident("this")
                    .property(method)
                    .call(vec![Expr::ident("value")]),
            ));
        }
        BindingAspect::ServerParameter => {
            let name = match &binding.expression {
                Expr::Identifier(name) => name.clone(),
                _ => {
                    return Err(CompileError::NotImplemented {
                        construct: "non-identifier server parameter",
                    })
                }
            };
            // A routed parameter change resets cached state and re-renders.
            let mut fresh_data = crate::js::ObjectLiteral::new();
            fresh_data.set(name, Expr::ident("value"));
            statements.push(Statement::Expression(
                Expr::from_chain(["this", "_d"]).assign(Expr::ObjectLiteral(fresh_data)),
            ));
            statements.push(Statement::Expression(Expr::Unary {
                operator: UnaryOperator::Delete,
                operand: Box::new(Expr::from_chain(["this", "_pC"])),
            }));
            statements.push(Statement::Expression(
                Expr::from_chain(["this", "_eC", "clear"]).call(Vec::new()),
            ));
            statements.push(Statement::Expression(
                Expr::from_chain(["this", "render"]).call(Vec::new()),
            ));
        }
    }

    Ok(statements)
}

fn swap_targets(binding: &Binding, node_data: &NodeDataStore) -> Result<(String, String)> {
    let data = node_data
        .get(binding.element)
        .ok_or(CompileError::UnknownAspect {
            aspect: "binding on unannotated element",
        })?;
    let identifier = data.identifier.clone().unwrap_or_default();
    let method = data
        .client_render_method
        .clone()
        .ok_or(CompileError::UnknownAspect {
            aspect: "swap binding without hoisted render method",
        })?;
    Ok((identifier, method))
}

/// DOM truncation for an iterator chain's synthetic `length` setter.
pub fn set_length_for_iterator_binding(
    binding: &Binding,
    node_data: &NodeDataStore,
    tree: &Tree,
) -> Statement {
    Statement::Expression(Expr::ident("setLength").call(vec![
        get_element(binding.element, node_data, tree),
        Expr::ident("value"),
    ]))
}
