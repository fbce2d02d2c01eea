//! Action visibility by role.

use crate::config::ActionDef;
use crate::config::Permissions;
use crate::config::Roles;

/// Returns `true` if the roles hold the capability the action requires.
pub fn is_authorized(action: &ActionDef, permissions: &Permissions, roles: &Roles) -> bool {
    permissions.allows(action.capability(), roles)
}

/// Filters actions down to those the roles may invoke, keeping their order.
pub fn allowed_actions<'c>(actions: &'c [ActionDef], permissions: &Permissions, roles: &Roles) -> Vec<&'c ActionDef> {
    actions
        .iter()
        .filter(|action| is_authorized(action, permissions, roles))
        .collect()
}
