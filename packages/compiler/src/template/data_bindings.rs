//! Binding Tree Builder
//!
//! Folds the flat binding list into the nested mapping tree the runtime
//! observables read. Each reachable leaf path corresponds to exactly one data
//! point, deduplicated by structural chain comparison where loop segments
//! compare by alias name.

use indexmap::IndexMap;

use crate::build::get_value::{get_length_from_iterator_binding, make_get_from_binding};
use crate::build::set_value::{make_set_from_binding, set_length_for_iterator_binding};
use crate::error::{CompileError, Result};
use crate::html::Tree;
use crate::js::{BinaryOperator, Expr, Function, ObjectLiteral, Statement};
use crate::settings::CompileSettings;

use super::{chain_to_string, Binding, BindingAspect, ChainSegment, NodeDataStore, VariableChain};

/// The declared shape of a component's data.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSignature {
    String,
    Number,
    Boolean,
    Date,
    Array(Box<TypeSignature>),
    Object(IndexMap<String, TypeSignature>),
}

impl TypeSignature {
    pub fn object<I>(fields: I) -> TypeSignature
    where
        I: IntoIterator<Item = (&'static str, TypeSignature)>,
    {
        TypeSignature::Object(
            fields
                .into_iter()
                .map(|(name, signature)| (name.to_string(), signature))
                .collect(),
        )
    }

    pub fn array(element: TypeSignature) -> TypeSignature {
        TypeSignature::Array(Box::new(element))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeSignature::String => "string",
            TypeSignature::Number => "number",
            TypeSignature::Boolean => "boolean",
            TypeSignature::Date => "Date",
            TypeSignature::Array(_) => "Array",
            TypeSignature::Object(_) => "object",
        }
    }

    /// Primitive leaves elide their `type` tag in the emitted tree.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeSignature::String | TypeSignature::Number | TypeSignature::Boolean
        )
    }

    /// The type a chain resolves to, walked from this signature.
    pub fn resolve(&self, chain: &[ChainSegment]) -> Option<&TypeSignature> {
        let mut current = self;
        for segment in chain {
            current = match (segment, current) {
                (ChainSegment::Property(name), TypeSignature::Object(fields)) => {
                    fields.get(name)?
                }
                (ChainSegment::Property(name), TypeSignature::Array(_)) if name == "length" => {
                    &TypeSignature::Number
                }
                (ChainSegment::Loop { .. }, TypeSignature::Array(element))
                | (ChainSegment::Index(_), TypeSignature::Array(element)) => element,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// One deduplicated variable chain with everything accumulated for it.
struct DataPoint {
    variable: VariableChain,
    type_signature: Option<TypeSignature>,
    is_external: bool,
    get_return_value: Option<Expr>,
    get_return_value_nullable: bool,
    set_statements: Vec<Statement>,
    push_statements: Vec<Statement>,
}

impl DataPoint {
    fn new(variable: VariableChain, type_signature: Option<TypeSignature>) -> Self {
        DataPoint {
            variable,
            type_signature,
            is_external: false,
            get_return_value: None,
            get_return_value_nullable: false,
            set_statements: Vec::new(),
            push_statements: Vec::new(),
        }
    }
}

fn chains_equal(left: &[ChainSegment], right: &[ChainSegment]) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|(a, b)| match (a, b) {
            (
                ChainSegment::Loop { alias: a, .. },
                ChainSegment::Loop { alias: b, .. },
            ) => a == b,
            (a, b) => a == b,
        })
}

fn find_data_point<'p>(
    points: &'p mut [DataPoint],
    chain: &[ChainSegment],
) -> Option<&'p mut DataPoint> {
    points
        .iter_mut()
        .find(|point| chains_equal(&point.variable, chain))
}

/// Builds the mapping tree object literal the runtime observables consume.
pub fn construct_bindings(
    bindings: &[Binding],
    node_data: &NodeDataStore,
    tree: &Tree,
    root_type: &TypeSignature,
    globals: &[String],
    settings: &CompileSettings,
) -> Result<ObjectLiteral> {
    let mut data_map: Vec<DataPoint> = Vec::new();

    for binding in bindings {
        for chain in &binding.references_variables {
            if find_data_point(&mut data_map, chain).is_none() {
                let type_signature = root_type.resolve(chain).cloned();
                data_map.push(DataPoint::new(chain.clone(), type_signature));
            }

            if binding.aspect == BindingAspect::Iterator {
                let mut length_chain = chain.clone();
                length_chain.push(ChainSegment::Property("length".to_string()));
                if find_data_point(&mut data_map, &length_chain).is_none() {
                    data_map.push(DataPoint::new(
                        length_chain.clone(),
                        Some(TypeSignature::Number),
                    ));
                }
                let length_point = find_data_point(&mut data_map, &length_chain)
                    .ok_or(CompileError::UnknownAspect {
                        aspect: "iterator length",
                    })?;
                // Client only builds never re-derive length from the DOM.
                if length_point.get_return_value.is_none() && settings.is_isomorphic() {
                    length_point.get_return_value =
                        Some(get_length_from_iterator_binding(binding, node_data, tree));
                }
                length_point
                    .set_statements
                    .push(set_length_for_iterator_binding(binding, node_data, tree));
            }

            let point = find_data_point(&mut data_map, chain).ok_or(
                CompileError::UnknownAspect {
                    aspect: "data point",
                },
            )?;

            let is_reversible = binding.aspect != BindingAspect::Iterator;
            let build_reverse =
                point.get_return_value.is_none() || point.get_return_value_nullable;
            if (settings.is_isomorphic() && is_reversible && build_reverse)
                || binding.aspect == BindingAspect::Data
            {
                if let Some(getter) = make_get_from_binding(binding, node_data, tree, chain) {
                    // A getter read out of a conditional branch may come back
                    // null at runtime, so later candidates compose with `??`
                    // to keep first-non-null read semantics.
                    if point.get_return_value_nullable {
                        let prior = point.get_return_value.take().ok_or(
                            CompileError::UnknownAspect {
                                aspect: "nullable getter without value",
                            },
                        )?;
                        point.get_return_value =
                            Some(prior.binary(BinaryOperator::NullCoalescing, getter));
                    } else {
                        point.get_return_value = Some(getter);
                    }
                    point.get_return_value_nullable = node_data.is_nullable(binding.element);
                }
            }

            let statements = make_set_from_binding(binding, node_data, tree, chain, globals)?;
            if binding.aspect == BindingAspect::Iterator {
                point.push_statements.extend(statements);
            } else {
                point.set_statements.extend(statements);
            }

            if binding.aspect == BindingAspect::Data {
                point.is_external = true;
            }
        }
    }

    if settings.is_isomorphic() && settings.strict_server_getters {
        for point in &data_map {
            if point.get_return_value.is_none() && !point.is_external {
                return Err(CompileError::MissingServerGetter {
                    chain: chain_to_string(&point.variable),
                });
            }
        }
    }

    let mut mapping_tree = ObjectLiteral::new();
    for point in &data_map {
        generate_branch(point, &mut mapping_tree)?;
    }
    Ok(mapping_tree)
}

fn new_branch() -> Expr {
    let mut branch = ObjectLiteral::new();
    branch.set("type", Expr::string("object"));
    Expr::ObjectLiteral(branch)
}

fn branch_entry(container: &mut ObjectLiteral, key: String) -> &mut ObjectLiteral {
    let entry = container.values.entry(key).or_insert_with(new_branch);
    if !matches!(entry, Expr::ObjectLiteral(_)) {
        *entry = new_branch();
    }
    match entry {
        Expr::ObjectLiteral(object) => object,
        _ => unreachable!("entry was just normalized to an object literal"),
    }
}

/// Walks one data point's chain into the nested tree, lettering positional
/// index parameters `x, y, z, …` by loop depth.
fn generate_branch(point: &DataPoint, tree: &mut ObjectLiteral) -> Result<()> {
    let mut container = tree;
    let mut positional_args: Vec<String> = Vec::new();

    for segment in &point.variable {
        let key = match segment {
            ChainSegment::Property(name) => name.clone(),
            ChainSegment::Loop { .. } => {
                let letter = char::from(b'x' + positional_args.len() as u8);
                positional_args.push(letter.to_string());
                "*".to_string()
            }
            ChainSegment::Index(_) => {
                return Err(CompileError::NotImplemented {
                    construct: "reacting to a numeric array index",
                })
            }
        };
        container = branch_entry(container, key);
    }

    if let Some(getter) = &point.get_return_value {
        let function = Function::new(
            Some("get".to_string()),
            positional_args.clone(),
            vec![Statement::Return(Some(getter.clone()))],
        );
        container.set("get", Expr::FunctionExpression(Box::new(function)));
    }

    if !point.push_statements.is_empty() {
        // A push never needs the innermost index, the new entry creates it.
        let mut parameters = vec!["value".to_string()];
        parameters
            .extend(positional_args[..positional_args.len().saturating_sub(1)].iter().cloned());
        let function = Function::new(
            Some("push".to_string()),
            parameters,
            point.push_statements.clone(),
        );
        container.set("push", Expr::FunctionExpression(Box::new(function)));
    }

    if !point.set_statements.is_empty() {
        let mut parameters = vec!["value".to_string()];
        parameters.extend(positional_args.iter().cloned());
        let function = Function::new(
            Some("set".to_string()),
            parameters,
            point.set_statements.clone(),
        );
        container.set("set", Expr::FunctionExpression(Box::new(function)));
    }

    match &point.type_signature {
        Some(signature) if signature.is_primitive() => {
            container.values.shift_remove("type");
        }
        Some(signature) => {
            container.set("type", Expr::string(signature.name()));
        }
        None => {
            container.values.shift_remove("type");
        }
    }
    Ok(())
}
