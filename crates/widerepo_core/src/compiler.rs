//! Condition compiler.
//!
//! Turns a typed property comparison into wire-level [`Condition`]s. The
//! compiler resolves attribute-name overrides, applies per-property
//! marshallers and splits composite identifiers into their key components.

use crate::error::{CoreError, CoreResult};
use crate::metadata::EntityMetadata;
use widerepo_codec::{
    to_attribute_value, AttributeValue, CodecError, ComparisonOperator, Condition, Value,
};

/// Compiles property comparisons for one entity type.
#[derive(Clone, Copy)]
pub struct ConditionCompiler<'m> {
    metadata: &'m dyn EntityMetadata,
}

impl<'m> ConditionCompiler<'m> {
    /// Creates a compiler for the entity described by `metadata`.
    pub fn new(metadata: &'m dyn EntityMetadata) -> Self {
        Self { metadata }
    }

    /// Encodes one value of `property`.
    ///
    /// A registered marshaller wins over the primitive encodings and always
    /// yields a string attribute.
    pub fn encode(&self, property: &str, value: &Value) -> CoreResult<AttributeValue> {
        if let Some(marshaller) = self.metadata.marshaller_for(property) {
            return Ok(AttributeValue::S(marshaller.marshall(value)?));
        }
        to_attribute_value(value).map_err(|err| match err {
            CodecError::UnsupportedType { type_name } => {
                CoreError::unsupported_type(property, type_name)
            }
            other => other.into(),
        })
    }

    /// Compiles `property <operator> values` into wire conditions.
    ///
    /// Usually yields one condition. `EQ` and `NE` on the composite
    /// identifier yield one condition per non-null key component.
    pub fn compile(
        &self,
        property: &str,
        operator: ComparisonOperator,
        values: &[Value],
    ) -> CoreResult<Vec<Condition>> {
        if self.metadata.is_composite_identifier_property(property)
            && matches!(operator, ComparisonOperator::Eq | ComparisonOperator::Ne)
        {
            return self.compile_composite(property, operator, values);
        }

        let attribute = self.metadata.attribute_name(property);
        let encoded = match operator {
            ComparisonOperator::In => self.encode_list(property, values)?,
            _ => {
                if !operator.accepts(values.len()) {
                    return Err(arity_error(property, operator, values.len()));
                }
                values
                    .iter()
                    .map(|value| self.encode(property, value))
                    .collect::<CoreResult<Vec<_>>>()?
            }
        };
        Ok(vec![Condition::new(attribute, operator, encoded)])
    }

    fn encode_list(&self, property: &str, values: &[Value]) -> CoreResult<Vec<AttributeValue>> {
        let [Value::List(items)] = values else {
            return Err(CoreError::unsupported_operation(format!(
                "IN on {property} requires a single list argument"
            )));
        };
        if items.is_empty() {
            return Err(CoreError::unsupported_operation(format!(
                "IN on {property} requires at least one value"
            )));
        }
        items.iter().map(|item| self.encode(property, item)).collect()
    }

    fn compile_composite(
        &self,
        property: &str,
        operator: ComparisonOperator,
        values: &[Value],
    ) -> CoreResult<Vec<Condition>> {
        let [id] = values else {
            return Err(arity_error(property, operator, values.len()));
        };
        let (partition, sort) = self.metadata.decompose_composite_id(id)?;

        let mut conditions = Vec::with_capacity(2);
        let partition_property = self.metadata.partition_key_property();
        if !partition.is_null() {
            conditions.push(Condition::new(
                self.metadata.attribute_name(partition_property),
                operator,
                vec![self.encode(partition_property, &partition)?],
            ));
        }
        if let Some(sort_property) = self.metadata.sort_key_property() {
            if !sort.is_null() {
                conditions.push(Condition::new(
                    self.metadata.attribute_name(sort_property),
                    operator,
                    vec![self.encode(sort_property, &sort)?],
                ));
            }
        }
        Ok(conditions)
    }
}

impl std::fmt::Debug for ConditionCompiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionCompiler")
            .field("table", &self.metadata.table_name())
            .finish()
    }
}

fn arity_error(property: &str, operator: ComparisonOperator, count: usize) -> CoreError {
    CoreError::unsupported_operation(format!(
        "{operator} on {property} does not take {count} value(s)"
    ))
}
