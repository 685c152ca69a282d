//! Ammo consumption and the fall-back to melee once it runs dry (4.3.4).

/// Consumes one shot if the unit carries ammo. Returns the remaining
/// count, or `None` if the unit is unlimited/melee.
pub fn consume(ammo: Option<u32>) -> Option<u32> {
    ammo.map(|a| a.saturating_sub(1))
}

/// True once a ranged unit must fight in melee this turn.
pub fn is_out_of_ammo(ammo: Option<u32>) -> bool {
    matches!(ammo, Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consuming_last_shot_reaches_zero() {
        assert_eq!(consume(Some(1)), Some(0));
        assert!(is_out_of_ammo(consume(Some(1))));
    }

    #[test]
    fn melee_units_are_unaffected() {
        assert_eq!(consume(None), None);
        assert!(!is_out_of_ammo(None));
    }
}
