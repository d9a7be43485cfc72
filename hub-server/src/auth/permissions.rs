//! Permission Definitions
//!
//! Two independent catalogues: one for super-admins, one for restaurant
//! staff. A role's permission list may contain catalogue entries, a
//! `module:*` wildcard over a catalogued module, or `all` (system roles only).

/// Super-admin catalogue
pub const ADMIN_PERMISSIONS: &[(&str, &str)] = &[
    ("restaurants:read", "View restaurants and their onboarding status"),
    ("restaurants:manage", "Approve, reject, suspend and reinstate restaurants"),
    ("admins:manage", "Manage super-admin accounts"),
    ("roles:manage", "Manage super-admin roles"),
    ("coupons:manage", "Manage platform-wide coupons"),
    ("customers:read", "View customer accounts"),
    ("customers:manage", "Enable or disable customer accounts"),
    ("reports:view", "View the platform dashboard"),
];

/// Restaurant staff catalogue
pub const STAFF_PERMISSIONS: &[(&str, &str)] = &[
    ("restaurant:settings", "Edit the restaurant profile, hours and location"),
    ("menu:read", "View the menu"),
    ("menu:manage", "Create, edit and delete menu entries"),
    ("orders:respond", "Confirm, reject or delay order requests"),
    ("orders:manage", "Update order and payment status"),
    ("coupons:manage", "Manage restaurant coupons"),
    ("staff:manage", "Manage staff accounts"),
    ("roles:manage", "Manage staff roles"),
    ("reports:view", "View restaurant reports"),
];

/// Granted to system roles
pub const ALL: &str = "all";

/// System role of the super-admin set
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// System role created for every restaurant
pub const OWNER_ROLE: &str = "owner";

/// Whether `permission` may be put on a custom role of the given catalogue
///
/// `all` is reserved for system roles.
pub fn is_valid_permission(catalogue: &[(&str, &str)], permission: &str) -> bool {
    if let Some(module) = permission.strip_suffix(":*") {
        return catalogue
            .iter()
            .any(|(code, _)| code.split(':').next() == Some(module));
    }
    catalogue.iter().any(|(code, _)| *code == permission)
}

/// First permission in `permissions` that is not valid, if any
pub fn find_unknown<'a>(catalogue: &[(&str, &str)], permissions: &'a [String]) -> Option<&'a str> {
    permissions
        .iter()
        .map(String::as_str)
        .find(|p| !is_valid_permission(catalogue, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_entries_are_valid() {
        for (code, _) in STAFF_PERMISSIONS {
            assert!(is_valid_permission(STAFF_PERMISSIONS, code));
        }
        for (code, _) in ADMIN_PERMISSIONS {
            assert!(is_valid_permission(ADMIN_PERMISSIONS, code));
        }
    }

    #[test]
    fn wildcards_over_known_modules() {
        assert!(is_valid_permission(STAFF_PERMISSIONS, "orders:*"));
        assert!(is_valid_permission(STAFF_PERMISSIONS, "menu:*"));
        assert!(!is_valid_permission(STAFF_PERMISSIONS, "tables:*"));
        assert!(!is_valid_permission(ADMIN_PERMISSIONS, "menu:*"));
    }

    #[test]
    fn all_is_reserved() {
        assert!(!is_valid_permission(STAFF_PERMISSIONS, ALL));
        assert!(!is_valid_permission(ADMIN_PERMISSIONS, ALL));
    }

    #[test]
    fn find_unknown_reports_first_offender() {
        let perms = vec![
            "menu:read".to_string(),
            "menu:fly".to_string(),
            "all".to_string(),
        ];
        assert_eq!(find_unknown(STAFF_PERMISSIONS, &perms), Some("menu:fly"));
        assert_eq!(find_unknown(STAFF_PERMISSIONS, &perms[..1]), None);
    }
}
