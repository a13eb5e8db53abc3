//! Snapshot differ: decides whether two stock snapshots amount to a reportable change.
//!
//! Pure and stateless. Attribution (reason, order, actor) is added by the
//! normalizer adapters, since the same comparison serves several event sources.

use invtrack_core::{AuditResult, ProductRef, StockSnapshot};

use crate::notes;

/// What kind of reportable change the differ found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeltaKind {
    TrackingDisabled,
    TrackingEnabled,
    QuantityChanged,
}

/// A detected change, not yet attributed to an event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub product: ProductRef,
    pub kind: DeltaKind,
    pub stock_before: Option<i64>,
    pub stock_after: Option<i64>,
    pub note: String,
}

impl StockDelta {
    /// `after - before`, only when both levels are known.
    pub fn stock_change(&self) -> Option<i64> {
        match (self.stock_before, self.stock_after) {
            (Some(before), Some(after)) => after.checked_sub(before),
            _ => None,
        }
    }
}

/// Compare `current` against `previous` for the product `identity`.
///
/// Returns `Ok(None)` when nothing reportable happened. A tracking-enabled
/// snapshot without a quantity is an `InvalidSnapshot` error.
pub fn diff(
    current: &StockSnapshot,
    previous: &StockSnapshot,
    identity: &ProductRef,
) -> AuditResult<Option<StockDelta>> {
    let sku = identity.sku_label();

    let delta = match (previous.tracking_enabled, current.tracking_enabled) {
        (false, false) => return Ok(None),
        (true, false) => StockDelta {
            product: identity.clone(),
            kind: DeltaKind::TrackingDisabled,
            stock_before: Some(previous.tracked_quantity()?),
            stock_after: None,
            note: notes::tracking_disabled(sku),
        },
        (false, true) => StockDelta {
            product: identity.clone(),
            kind: DeltaKind::TrackingEnabled,
            stock_before: None,
            stock_after: Some(current.tracked_quantity()?),
            note: notes::tracking_enabled(sku),
        },
        (true, true) => {
            let before = previous.tracked_quantity()?;
            let after = current.tracked_quantity()?;
            if before == after {
                return Ok(None);
            }
            StockDelta {
                product: identity.clone(),
                kind: DeltaKind::QuantityChanged,
                stock_before: Some(before),
                stock_after: Some(after),
                note: notes::quantity_updated(sku, after),
            }
        }
    };

    Ok(Some(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use invtrack_core::{AuditError, ProductId};
    use proptest::prelude::*;

    fn identity() -> ProductRef {
        ProductRef::new(ProductId::new(7), Some("SKU-7".to_string()))
    }

    fn snapshot_strategy() -> impl Strategy<Value = StockSnapshot> {
        prop_oneof![
            Just(StockSnapshot::untracked()),
            (-10_000i64..10_000).prop_map(StockSnapshot::tracked),
        ]
    }

    #[test]
    fn quantity_drop_reports_negative_change() {
        let delta = diff(&StockSnapshot::tracked(7), &StockSnapshot::tracked(10), &identity())
            .unwrap()
            .unwrap();

        assert_eq!(delta.kind, DeltaKind::QuantityChanged);
        assert_eq!(delta.stock_before, Some(10));
        assert_eq!(delta.stock_after, Some(7));
        assert_eq!(delta.stock_change(), Some(-3));
        assert_eq!(delta.note, "stock for SKU-7 updated to 7");
    }

    #[test]
    fn disabling_tracking_keeps_only_before() {
        let delta = diff(&StockSnapshot::untracked(), &StockSnapshot::tracked(5), &identity())
            .unwrap()
            .unwrap();

        assert_eq!(delta.kind, DeltaKind::TrackingDisabled);
        assert_eq!(delta.stock_before, Some(5));
        assert_eq!(delta.stock_after, None);
        assert_eq!(delta.stock_change(), None);
        assert!(delta.note.contains("disabled"));
    }

    #[test]
    fn enabling_tracking_keeps_only_after() {
        let delta = diff(&StockSnapshot::tracked(3), &StockSnapshot::untracked(), &identity())
            .unwrap()
            .unwrap();

        assert_eq!(delta.kind, DeltaKind::TrackingEnabled);
        assert_eq!(delta.stock_before, None);
        assert_eq!(delta.stock_after, Some(3));
        assert!(delta.note.contains("enabled"));
    }

    #[test]
    fn missing_quantity_on_tracked_snapshot_is_an_error() {
        let broken = StockSnapshot {
            tracking_enabled: true,
            quantity: None,
        };

        let err = diff(&broken, &StockSnapshot::tracked(1), &identity()).unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));

        let err = diff(&StockSnapshot::untracked(), &broken, &identity()).unwrap_err();
        assert!(matches!(err, AuditError::InvalidSnapshot(_)));
    }

    #[test]
    fn missing_sku_renders_empty_label() {
        let anon = ProductRef::new(ProductId::new(1), None);
        let delta = diff(&StockSnapshot::tracked(2), &StockSnapshot::tracked(1), &anon)
            .unwrap()
            .unwrap();
        assert_eq!(delta.note, "stock for  updated to 2");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: untracked on both sides never reports anything.
        #[test]
        fn both_untracked_is_no_change(_seed in any::<u8>()) {
            let out = diff(&StockSnapshot::untracked(), &StockSnapshot::untracked(), &identity()).unwrap();
            prop_assert!(out.is_none());
        }

        /// Property: equal tracked quantities never report anything.
        #[test]
        fn equal_quantities_are_no_change(qty in any::<i32>()) {
            let snap = StockSnapshot::tracked(qty as i64);
            prop_assert!(diff(&snap, &snap, &identity()).unwrap().is_none());
        }

        /// Property: differing tracked quantities report exactly current - previous.
        #[test]
        fn change_is_current_minus_previous(prev in -1_000_000i64..1_000_000, cur in -1_000_000i64..1_000_000) {
            prop_assume!(prev != cur);
            let delta = diff(&StockSnapshot::tracked(cur), &StockSnapshot::tracked(prev), &identity())
                .unwrap()
                .unwrap();
            prop_assert_eq!(delta.stock_change(), Some(cur - prev));
            prop_assert_eq!(delta.stock_after.unwrap() - delta.stock_before.unwrap(), cur - prev);
        }

        /// Property: diff holds no hidden state.
        #[test]
        fn diff_is_idempotent(cur in snapshot_strategy(), prev in snapshot_strategy()) {
            let first = diff(&cur, &prev, &identity()).unwrap();
            let second = diff(&cur, &prev, &identity()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
