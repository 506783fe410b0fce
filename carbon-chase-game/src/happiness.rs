//! Customer happiness derived from the options chosen so far.
use crate::catalog::{Catalog, CatalogError};
use crate::constants::MAX_OPTION_RATING;
use crate::numbers::{floor_f64_to_pct, usize_to_f64};
use crate::state::{SessionState, Selections};

/// Happiness percentage over the filled slots only.
///
/// Unfilled slots are ignored, so partial progress is not penalised.
///
/// # Errors
///
/// Returns an error if a chosen option is not in `catalog`.
pub fn happiness_pct(selections: &Selections, catalog: &Catalog) -> Result<u8, CatalogError> {
    let (count, total) = selections.chosen().try_fold(
        (0_usize, 0_usize),
        |(count, total), (product, process, option)| {
            let option = catalog.get(product, process, option)?;
            Ok::<_, CatalogError>((count + 1, total + usize::from(option.happiness)))
        },
    )?;
    if count == 0 {
        return Ok(0);
    }
    let max = usize_to_f64(usize::from(MAX_OPTION_RATING) * count);
    Ok(floor_f64_to_pct(100.0 * usize_to_f64(total) / max))
}

/// Recompute the session's happiness from scratch. On error the previous
/// value is kept.
///
/// # Errors
///
/// Returns an error if a chosen option is not in `catalog`.
pub fn recompute(state: &mut SessionState, catalog: &Catalog) -> Result<(), CatalogError> {
    state.happiness_pct = happiness_pct(&state.selections, catalog)?;
    Ok(())
}
