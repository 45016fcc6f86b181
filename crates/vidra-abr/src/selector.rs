use crate::types::{AbrMode, Rendition};

/// Fraction of estimated throughput available to the selected bitrate.
/// A fixed 15% margin absorbs measurement noise and container overhead.
pub const SAFETY_MARGIN: f64 = 0.85;

/// Pick the representation to fetch next.
///
/// Manual mode returns the pinned label clamped to the rendition list;
/// throughput is ignored entirely. Auto mode picks the highest bitrate not
/// exceeding `throughput_kbps * SAFETY_MARGIN`, falling back to the
/// cheapest rendition when nothing fits.
///
/// Renditions are ordered ascending by `(bitrate, label)`, so equal inputs
/// always produce the same choice. Returns `None` only for an empty list.
pub fn select(renditions: &[Rendition], throughput_kbps: f64, mode: &AbrMode) -> Option<String> {
    let mut ordered: Vec<&Rendition> = renditions.iter().collect();
    ordered.sort_by(|a, b| {
        a.bitrate_kbps
            .cmp(&b.bitrate_kbps)
            .then_with(|| a.label.cmp(&b.label))
    });

    let cheapest = ordered.first()?;

    if let AbrMode::Manual(label) = mode {
        let clamped = ordered
            .iter()
            .find(|r| r.label == *label)
            .unwrap_or(cheapest);
        return Some(clamped.label.clone());
    }

    let budget = throughput_kbps * SAFETY_MARGIN;
    let chosen = ordered
        .iter()
        .rev()
        .find(|r| r.bitrate_kbps as f64 <= budget)
        .unwrap_or(cheapest);

    Some(chosen.label.clone())
}
