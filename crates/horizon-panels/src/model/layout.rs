//! Column width distribution.

/// Resolve column widths against the available `total`.
///
/// Fixed widths are kept as given. Whatever space they leave is split evenly
/// between the auto columns (`None`); when the fixed columns already fill
/// `total`, auto columns get zero.
///
/// ```
/// use horizon_panels::model::distribute_widths;
///
/// assert_eq!(distribute_widths(&[Some(100), None, None], 500), vec![100, 200, 200]);
/// assert_eq!(distribute_widths(&[Some(400), None], 300), vec![400, 0]);
/// ```
pub fn distribute_widths(widths: &[Option<u32>], total: u32) -> Vec<u32> {
    let fixed: u32 = widths
        .iter()
        .flatten()
        .fold(0u32, |sum, w| sum.saturating_add(*w));
    let auto_count = widths.iter().filter(|w| w.is_none()).count() as u32;
    let share = match auto_count {
        0 => 0,
        n => total.saturating_sub(fixed) / n,
    };

    widths.iter().map(|w| w.unwrap_or(share)).collect()
}
