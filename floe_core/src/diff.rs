//! Diffing of required vs. granted access.
//!
//! Each category is diffed independently. A table that is present while its
//! parent schema is not yields two findings, one in each category; the
//! closure property on the required side guarantees the parent is there to
//! be found. An empty existing set is not special-cased: the result is then
//! the required set verbatim, and whatever "could not read grants" means is
//! the caller's concern, not this engine's.

use crate::access::{AccessCategory, ExistingAccessSet, MissingAccessSet, RequiredAccessSet};

/// Compute the per-category, case-insensitive gap between what a role needs
/// and what it already holds.
pub fn diff(required: &RequiredAccessSet, existing: &ExistingAccessSet) -> MissingAccessSet {
    let mut missing = MissingAccessSet::default();
    for category in AccessCategory::ALL {
        let granted = existing.category(category);
        let open = missing.category_mut(category);
        for name in required.category(category) {
            // QualifiedName compares on its canonical uppercase form, so
            // this lookup is case-insensitive.
            if !granted.contains_key(name) {
                open.insert(name.clone());
            }
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::access::{AccessSet, InheritedVia};
    use crate::qual::QualifiedName;

    fn required_fixture() -> AccessSet {
        let mut required = AccessSet::default();
        required.add_view(QualifiedName::new("DB.SCH.V1"));
        required.add_table(QualifiedName::new("DB.SCH.BASE"));
        required.add_agent(QualifiedName::new("DB.SCH.MY_AGENT"));
        required.add_warehouse(QualifiedName::new("COMPUTE_WH"));
        required
    }

    #[test]
    fn empty_existing_yields_required_verbatim() {
        let required = required_fixture();
        let missing = diff(&required, &ExistingAccessSet::default());
        assert_eq!(missing, required);
    }

    #[test]
    fn diff_is_case_insensitive() {
        let mut required = AccessSet::default();
        required.tables.insert(QualifiedName::new("db.s.T"));

        let mut existing = ExistingAccessSet::default();
        existing.grant(
            AccessCategory::Tables,
            QualifiedName::new("DB.S.t"),
            InheritedVia::Direct,
        );

        let missing = diff(&required, &existing);
        assert!(missing.tables.is_empty());
    }

    #[test]
    fn diff_is_idempotent() {
        let required = required_fixture();
        let mut existing = ExistingAccessSet::default();
        existing.grant(
            AccessCategory::Databases,
            QualifiedName::new("DB"),
            InheritedVia::Direct,
        );

        let first = diff(&required, &existing);
        let second = diff(&required, &existing);
        assert_eq!(first, second);
    }

    #[test]
    fn categories_are_independent_findings() {
        let mut required = AccessSet::default();
        required.add_table(QualifiedName::new("DB.SCH.BASE"));

        // Table granted, but not its parent schema: the schema is still a
        // finding of its own.
        let mut existing = ExistingAccessSet::default();
        existing.grant(
            AccessCategory::Tables,
            QualifiedName::new("DB.SCH.BASE"),
            InheritedVia::Direct,
        );
        existing.grant(
            AccessCategory::Databases,
            QualifiedName::new("DB"),
            InheritedVia::Direct,
        );

        let missing = diff(&required, &existing);
        assert!(missing.tables.is_empty());
        assert_eq!(missing.schemas.len(), 1);
        assert!(missing.databases.is_empty());
    }

    #[test]
    fn required_is_union_of_existing_and_missing() {
        let required = required_fixture();

        let mut existing = ExistingAccessSet::default();
        existing.grant(
            AccessCategory::Databases,
            QualifiedName::new("DB"),
            InheritedVia::Direct,
        );
        existing.grant(
            AccessCategory::Views,
            QualifiedName::new("DB.SCH.V1"),
            InheritedVia::ViaHierarchy,
        );

        let missing = diff(&required, &existing);
        for category in AccessCategory::ALL {
            let mut union = missing.category(category).clone();
            union.extend(existing.category(category).keys().cloned());
            assert_eq!(&union, required.category(category));
        }
    }

    #[test]
    fn fully_granted_role_reports_zero_missing() {
        let required = required_fixture();
        let mut existing = ExistingAccessSet::default();
        for category in AccessCategory::ALL {
            for name in required.category(category) {
                existing.grant(category, name.clone(), InheritedVia::Direct);
            }
        }

        let missing = diff(&required, &existing);
        assert_eq!(missing.total(), 0);
        assert!(missing.is_empty());
    }
}
