//! Central role -> capability lookup.
//!
//! Every protected route names the capability tags it requires; the
//! permission middleware resolves the caller's role here and allows the
//! request when the role carries at least one required tag. Roles and tags
//! are plain strings so adding a role is a table edit, not a code change
//! scattered across handlers.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const LEAD_VIEW: &str = "lead_view";
pub const LEAD_CREATE: &str = "lead_create";
pub const MOVE_LEAD: &str = "move_lead";
pub const LEAD_LABELS: &str = "lead_labels";
pub const PHONEBOOK: &str = "phonebook";
pub const COMMISSIONS: &str = "commissions";
pub const PAY_COMMISSION: &str = "pay_commission";

static ROLE_CAPABILITIES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    map.insert(
        "ceo",
        &[
            LEAD_VIEW,
            LEAD_CREATE,
            MOVE_LEAD,
            LEAD_LABELS,
            PHONEBOOK,
            COMMISSIONS,
            PAY_COMMISSION,
        ][..],
    );
    map.insert(
        "hod",
        &[
            LEAD_VIEW,
            LEAD_CREATE,
            MOVE_LEAD,
            LEAD_LABELS,
            PHONEBOOK,
            COMMISSIONS,
        ][..],
    );
    map.insert(
        "manager",
        &[LEAD_VIEW, LEAD_CREATE, MOVE_LEAD, LEAD_LABELS, PHONEBOOK][..],
    );
    map.insert("team_leader", &[LEAD_VIEW, LEAD_CREATE, MOVE_LEAD, PHONEBOOK][..]);
    map.insert("agent", &[LEAD_VIEW, LEAD_CREATE, PHONEBOOK][..]);
    map
});

/// Capability set for a role. Unknown roles hold no capabilities.
pub fn capabilities_for(role: &str) -> &'static [&'static str] {
    ROLE_CAPABILITIES.get(role).copied().unwrap_or(&[])
}

/// True when the role carries at least one of the required tags
pub fn has_any(role: &str, required: &[&str]) -> bool {
    let held = capabilities_for(role);
    required.iter().any(|tag| held.contains(tag))
}
