//! Route selection among candidate estimates.

use crate::types::CommutingInfo;

/// How to pick the representative route among N candidates — one provider's
/// alternatives or several providers' answers. The choice is always an
/// explicit parameter, never hidden behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Trust the upstream source's own ranking.
    #[default]
    FirstCandidate,
    /// Pick the fastest candidate; ties keep the upstream order.
    MinimumMinutes,
}

/// Select one route from the candidates, `None` when empty.
pub fn select_route(
    candidates: &[CommutingInfo],
    strategy: SelectionStrategy,
) -> Option<&CommutingInfo> {
    match strategy {
        SelectionStrategy::FirstCandidate => candidates.first(),
        SelectionStrategy::MinimumMinutes => candidates.iter().min_by_key(|c| c.minutes),
    }
}
