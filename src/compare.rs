//! Directional comparators turning raw quantity and price deltas into
//! business-meaningful transitions.
//!
//! Unlike the diff engines, these re-derive from the domain fields of the two
//! observations: the classifications are directional predicates (depleted,
//! restocked, sale started), not symmetric differences.

use serde::{Deserialize, Serialize};

use crate::model::Product;

/// Stock movement between two observations of the same product.
///
/// `self` is the earlier observation and the argument the newer one
/// throughout; the flags describe the transition into the newer state.
/// Computed fresh on every call and never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityTransition {
    /// How many pieces fewer the newer observation has. Zero means no
    /// decrease.
    pub decrease: u32,
    /// How many pieces more the newer observation has. Zero means no
    /// increase.
    pub increase: u32,
    /// Stock went from more than one piece down to exactly one.
    ///
    /// This is the transition form: two observations that both already hold
    /// one piece do not set it. The state form is
    /// [`Product::is_last_piece`].
    pub is_last_piece: bool,
    /// Stock went from available to empty.
    pub is_depleted: bool,
    /// Stock went from empty to available.
    pub is_restocked: bool,
}

/// Pricing movement between two observations of the same product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTransition {
    /// Drop in the full price. Zero means no decrease.
    pub price_full_decrease: f64,
    /// Rise in the full price. Zero means no increase.
    pub price_full_increase: f64,
    /// Drop in the current selling price. Zero means no decrease.
    pub price_curr_decrease: f64,
    /// Rise in the current selling price. Zero means no increase.
    pub price_curr_increase: f64,
    /// Drop in the derived discount rate. Zero means no decrease.
    pub discount_rate_decrease: f64,
    /// Rise in the derived discount rate. Zero means no increase.
    pub discount_rate_increase: f64,
    /// The newer observation is on sale while the older one was not.
    ///
    /// An ongoing sale whose depth changes sets neither this nor
    /// `sale_ended`.
    pub sale_started: bool,
    /// The newer observation is not on sale while the older one was.
    pub sale_ended: bool,
}

impl Product {
    /// Compare stock between this observation and a newer one of the same
    /// product.
    ///
    /// Exactly one of decrease, increase, or equality holds; comparing a
    /// record with itself yields the all-zero transition.
    pub fn compare_quantity(&self, newer: &Product) -> QuantityTransition {
        QuantityTransition {
            decrease: self.quantity.saturating_sub(newer.quantity),
            increase: newer.quantity.saturating_sub(self.quantity),
            is_last_piece: newer.quantity == 1 && self.quantity > 1,
            is_depleted: newer.quantity == 0 && self.quantity > 0,
            is_restocked: self.quantity == 0 && newer.quantity > 0,
        }
    }

    /// Compare pricing between this observation and a newer one of the same
    /// product.
    pub fn compare_price(&self, newer: &Product) -> PriceTransition {
        let (price_full_decrease, price_full_increase) =
            directional(self.price_full, newer.price_full);
        let (price_curr_decrease, price_curr_increase) =
            directional(self.price_curr, newer.price_curr);
        let (discount_rate_decrease, discount_rate_increase) =
            directional(self.discount_rate(), newer.discount_rate());
        PriceTransition {
            price_full_decrease,
            price_full_increase,
            price_curr_decrease,
            price_curr_increase,
            discount_rate_decrease,
            discount_rate_increase,
            sale_started: !self.is_on_sale() && newer.is_on_sale(),
            sale_ended: self.is_on_sale() && !newer.is_on_sale(),
        }
    }
}

/// Split a delta between an older and a newer value into its decrease and
/// increase components; at most one of the pair is positive.
fn directional(older: f64, newer: f64) -> (f64, f64) {
    if older > newer {
        (older - newer, 0.0)
    } else if older < newer {
        (0.0, newer - older)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::model::RecordMeta;

    use super::*;

    fn product(quantity: u32, price_full: f64, price_curr: f64) -> Product {
        Product {
            meta: RecordMeta::new(Utc::now()),
            id: 1480,
            name: "Bageta šunka".to_string(),
            category: "Sendviče".to_string(),
            is_vegetarian: false,
            is_gluten_free: false,
            is_promo: false,
            quantity,
            price_full,
            price_curr,
            info: String::new(),
            pic_url: String::new(),
            location_id: 296,
        }
    }

    #[test]
    fn depletion_sets_the_decrease_and_flag() {
        let transition = product(5, 10.0, 10.0).compare_quantity(&product(0, 10.0, 10.0));
        assert_eq!(
            transition,
            QuantityTransition {
                decrease: 5,
                increase: 0,
                is_last_piece: false,
                is_depleted: true,
                is_restocked: false,
            }
        );
    }

    #[test]
    fn restock_is_the_mirror_transition() {
        let transition = product(0, 10.0, 10.0).compare_quantity(&product(3, 10.0, 10.0));
        assert_eq!(transition.increase, 3);
        assert_eq!(transition.decrease, 0);
        assert!(transition.is_restocked);
        assert!(!transition.is_depleted);
    }

    #[test]
    fn last_piece_fires_only_on_the_transition_into_one() {
        assert!(product(3, 1.0, 1.0).compare_quantity(&product(1, 1.0, 1.0)).is_last_piece);
        // both sides already at one: state, not a transition
        assert!(!product(1, 1.0, 1.0).compare_quantity(&product(1, 1.0, 1.0)).is_last_piece);
        // restock up to one piece is not a last-piece event either
        assert!(!product(0, 1.0, 1.0).compare_quantity(&product(1, 1.0, 1.0)).is_last_piece);
    }

    #[test]
    fn self_comparison_is_all_zero() {
        let bageta = product(4, 59.9, 49.9);
        assert_eq!(bageta.compare_quantity(&bageta), QuantityTransition::default());
        assert_eq!(bageta.compare_price(&bageta), PriceTransition::default());
    }

    #[test]
    fn decrease_and_increase_are_mutually_exclusive() {
        for old in 0u32..5 {
            for new in 0u32..5 {
                let transition = product(old, 1.0, 1.0).compare_quantity(&product(new, 1.0, 1.0));
                let moved = [transition.decrease > 0, transition.increase > 0, old == new];
                assert_eq!(moved.iter().filter(|flag| **flag).count(), 1);
            }
        }
    }

    #[test]
    fn sale_start_carries_the_price_and_rate_deltas() {
        let before = product(2, 10.0, 10.0);
        let after = product(2, 10.0, 5.0);
        let transition = before.compare_price(&after);
        assert_eq!(transition.price_curr_decrease, 5.0);
        assert_eq!(transition.price_curr_increase, 0.0);
        assert_eq!(transition.discount_rate_increase, 0.5);
        assert_eq!(transition.discount_rate_decrease, 0.0);
        assert!(transition.sale_started);
        assert!(!transition.sale_ended);
    }

    #[test]
    fn sale_end_mirrors_the_flags() {
        let before = product(2, 10.0, 5.0);
        let after = product(2, 10.0, 10.0);
        let transition = before.compare_price(&after);
        assert!(transition.sale_ended);
        assert!(!transition.sale_started);
        assert_eq!(transition.price_curr_increase, 5.0);
        assert_eq!(transition.discount_rate_decrease, 0.5);
    }

    #[test]
    fn deepening_an_ongoing_sale_triggers_neither_flag() {
        let shallow = product(2, 10.0, 5.0);
        let deep = product(2, 10.0, 2.5);
        let transition = shallow.compare_price(&deep);
        assert!(!transition.sale_started);
        assert!(!transition.sale_ended);
        assert_eq!(transition.price_curr_decrease, 2.5);
        assert_eq!(transition.discount_rate_increase, 0.25);
    }

    #[test]
    fn full_price_moves_are_tracked_directionally() {
        let before = product(2, 10.0, 10.0);
        let after = product(2, 12.0, 12.0);
        let transition = before.compare_price(&after);
        assert_eq!(transition.price_full_increase, 2.0);
        assert_eq!(transition.price_full_decrease, 0.0);
        assert!(!transition.sale_started);
    }
}
