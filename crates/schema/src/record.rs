use crate::error::RecordError;
use crate::model::Schema;

impl Schema {
    /// Split a piped-text record into its column values.
    ///
    /// The column at index `i` belongs to the field declared at position
    /// `i`. A record with fewer columns than the schema declares is a
    /// per-record error; surplus columns are ignored so trailing free-form
    /// content cannot break ingestion.
    pub fn parse_record(&self, line: &str) -> Result<Vec<String>, RecordError> {
        let needed = self.max_position() as usize + 1;
        let columns: Vec<&str> = line.split('|').collect();
        if columns.len() < needed {
            return Err(RecordError::MissingColumns {
                found: columns.len(),
                needed,
            });
        }
        Ok(columns[..needed]
            .iter()
            .map(|column| column.trim().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RecordError;
    use crate::field::{FieldKind, FieldSpec};
    use crate::model::Schema;
    use crate::tier::ScoreTier;

    fn schema() -> Schema {
        Schema::new(
            vec![
                FieldSpec::new("id", 0, FieldKind::Id),
                FieldSpec::new("database", 1, FieldKind::Database),
                FieldSpec::new("title", 2, FieldKind::IndexedNGram),
                FieldSpec::new("year", 3, FieldKind::Exact),
            ],
            vec![ScoreTier::new(0.9, 1)],
        )
        .expect("schema builds")
    }

    #[test]
    fn splits_by_position() {
        let params = schema()
            .parse_record("1|db1|Machine Learning|2020")
            .expect("record parses");
        assert_eq!(params, vec!["1", "db1", "Machine Learning", "2020"]);
    }

    #[test]
    fn values_are_trimmed() {
        let params = schema()
            .parse_record(" 1 | db1 |  Machine Learning | 2020 ")
            .expect("record parses");
        assert_eq!(params[2], "Machine Learning");
    }

    #[test]
    fn missing_columns_is_a_record_error() {
        let err = schema()
            .parse_record("1|db1|Machine Learning")
            .expect_err("too few columns");
        assert!(matches!(
            err,
            RecordError::MissingColumns { found: 3, needed: 4 }
        ));
    }

    #[test]
    fn surplus_columns_are_ignored() {
        let params = schema()
            .parse_record("1|db1|Machine Learning|2020|junk|more junk")
            .expect("record parses");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn empty_columns_parse_as_empty_values() {
        let params = schema().parse_record("1|db1||").expect("record parses");
        assert_eq!(params[2], "");
        assert_eq!(params[3], "");
    }
}
