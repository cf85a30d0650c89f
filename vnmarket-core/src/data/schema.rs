use polars::prelude::*;

/// Frame schema produced by `IndexTable::to_dataframe`
pub struct IndexSchema;

impl IndexSchema {
    /// Get the canonical index frame schema
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("closing_value".into(), DataType::Float64),
            Field::new("percent_change".into(), DataType::Float64),
        ])
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        validate_against(df, &Self::schema())
    }
}

/// Frame schema produced by `PriceVolumeTable::to_dataframe`
pub struct PriceVolumeSchema;

impl PriceVolumeSchema {
    /// Get the canonical price/volume frame schema
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("ticker".into(), DataType::String),
            Field::new("trading_date".into(), DataType::Date),
            Field::new("closing_price".into(), DataType::Float64),
            Field::new("matching_volume".into(), DataType::Float64),
            Field::new("matching_value".into(), DataType::Float64),
        ])
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        validate_against(df, &Self::schema())
    }
}

/// Check that every expected column exists with the expected type.
fn validate_against(df: &DataFrame, expected: &Schema) -> Result<(), SchemaError> {
    let actual = df.schema();

    for field in expected.iter_fields() {
        let actual_dtype = actual
            .get(field.name())
            .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
        if actual_dtype != field.dtype() {
            return Err(SchemaError::TypeMismatch {
                column: field.name().to_string(),
                expected: field.dtype().clone(),
                actual: actual_dtype.clone(),
            });
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}
