use std::collections::HashMap;

use crate::error::SchemaError;
use crate::field::{FieldKind, FieldSpec};
use crate::tier::ScoreTier;

/// Immutable, fully validated record schema.
///
/// Built once from the declared field list and tier table, then shared
/// read-only by every comparison in a run. Fields are stored in position
/// order, so the vector index of a field equals its declared position.
#[derive(Debug)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, usize>,
    tiers: Vec<ScoreTier>,
    id_pos: usize,
    database_pos: usize,
    indexed_pos: usize,
    authors_pos: Option<usize>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>, tiers: Vec<ScoreTier>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }

        let count = fields.len();
        let mut slots: Vec<Option<FieldSpec>> = (0..count).map(|_| None).collect();
        for field in fields {
            let position = field.position;
            let slot = slots.get_mut(position as usize).ok_or(
                SchemaError::PositionOutOfRange {
                    position,
                    count,
                },
            )?;
            if slot.is_some() {
                return Err(SchemaError::DuplicatePosition(position));
            }
            *slot = Some(field);
        }
        // Unique positions all below `count` fill every slot, so a gap can
        // only appear together with a duplicate or an out-of-range position
        // and both were just rejected.
        let fields: Vec<FieldSpec> = slots
            .into_iter()
            .map(|slot| slot.expect("position table is total"))
            .collect();

        let mut by_name = HashMap::with_capacity(count);
        for (idx, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateName(field.name.clone()));
            }
        }

        let id_pos = Self::exactly_one(&fields, "id", |k| matches!(k, FieldKind::Id))?;
        let database_pos =
            Self::exactly_one(&fields, "database", |k| matches!(k, FieldKind::Database))?;
        let indexed_pos = Self::exactly_one(&fields, "indexed n-gram", |k| {
            matches!(k, FieldKind::IndexedNGram)
        })?;

        let authors: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| matches!(f.kind, FieldKind::Authors))
            .map(|(idx, _)| idx)
            .collect();
        if authors.len() > 1 {
            return Err(SchemaError::TooManyAuthors(authors.len()));
        }
        let authors_pos = authors.first().copied();

        for field in &fields {
            if let Some(required) = &field.required_field {
                let target = by_name.get(required).ok_or_else(|| {
                    SchemaError::UnknownRequiredField {
                        field: field.name.clone(),
                        required: required.clone(),
                    }
                })?;
                if fields[*target].position >= field.position {
                    return Err(SchemaError::ForwardRequirement {
                        field: field.name.clone(),
                        required: required.clone(),
                    });
                }
            }

            match &field.kind {
                FieldKind::NGram { min_score } | FieldKind::Dice { min_score } => {
                    if !(0.0..=1.0).contains(min_score) {
                        return Err(SchemaError::InvalidMinScore {
                            field: field.name.clone(),
                            value: *min_score,
                        });
                    }
                }
                FieldKind::RegExp { group, .. } => {
                    if *group < 1 {
                        return Err(SchemaError::InvalidCaptureGroup {
                            field: field.name.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        if !fields.iter().any(|f| f.kind.is_comparable()) {
            return Err(SchemaError::NoComparableField);
        }

        Self::validate_tiers(&tiers)?;

        Ok(Self {
            fields,
            by_name,
            tiers,
            id_pos,
            database_pos,
            indexed_pos,
            authors_pos,
        })
    }

    fn exactly_one(
        fields: &[FieldSpec],
        kind: &'static str,
        pred: impl Fn(&FieldKind) -> bool,
    ) -> Result<usize, SchemaError> {
        let matches: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| pred(&f.kind))
            .map(|(idx, _)| idx)
            .collect();
        if matches.len() != 1 {
            return Err(SchemaError::WrongCardinality {
                kind,
                found: matches.len(),
            });
        }
        Ok(matches[0])
    }

    fn validate_tiers(tiers: &[ScoreTier]) -> Result<(), SchemaError> {
        if tiers.is_empty() {
            return Err(SchemaError::EmptyTiers);
        }
        let mut seen = Vec::with_capacity(tiers.len());
        for tier in tiers {
            if !(0.0..=1.0).contains(&tier.min_similarity) {
                return Err(SchemaError::InvalidTierSimilarity(tier.min_similarity));
            }
            if seen.contains(&tier.min_similarity.to_bits()) {
                return Err(SchemaError::DuplicateTier(tier.min_similarity));
            }
            seen.push(tier.min_similarity.to_bits());
        }
        Ok(())
    }

    /// All fields in position order; the slice index equals the position.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).map(|idx| &self.fields[*idx])
    }

    pub fn id_field(&self) -> &FieldSpec {
        &self.fields[self.id_pos]
    }

    pub fn database_field(&self) -> &FieldSpec {
        &self.fields[self.database_pos]
    }

    pub fn indexed_field(&self) -> &FieldSpec {
        &self.fields[self.indexed_pos]
    }

    pub fn authors_field(&self) -> Option<&FieldSpec> {
        self.authors_pos.map(|idx| &self.fields[idx])
    }

    /// Highest declared position; incoming records need at least this many
    /// columns plus one.
    pub fn max_position(&self) -> u32 {
        (self.fields.len() - 1) as u32
    }

    /// Score tiers in declared order. Never empty.
    pub fn tiers(&self) -> &[ScoreTier] {
        &self.tiers
    }

    /// The lowest similarity any tier accepts; candidates scoring below this
    /// can never be accepted and are only worth a bounded lookahead.
    pub fn similarity_floor(&self) -> f32 {
        self.tiers
            .iter()
            .map(|t| t.min_similarity)
            .fold(f32::INFINITY, f32::min)
    }
}
