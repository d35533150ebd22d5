//! Role names and the canonical permission set.
//!
//! Permissions are persisted as their `SCREAMING_SNAKE_CASE` names in
//! `role_permissions`, so renaming a variant is a data migration.

use std::collections::BTreeSet;

pub const ROLE_OWNER: &str = "ROLE_OWNER";
pub const ROLE_CUSTOMER: &str = "ROLE_CUSTOMER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    ViewDashboard,
    ViewProducts,
    AddProducts,
    EditProducts,
    DeleteProducts,
    ViewInventory,
    AddInventoryItems,
    EditInventoryItems,
    DeleteInventoryItems,
    AdjustInventoryStock,
    ViewOrders,
    EditOrders,
    ViewCustomers,
    EditCustomers,
    ViewAdmins,
    AddAdmins,
    EditAdmins,
    ViewSiteSettings,
    EditSiteSettings,
    ViewActivityLog,
}

impl Permission {
    pub const ALL: [Permission; 20] = [
        Permission::ViewDashboard,
        Permission::ViewProducts,
        Permission::AddProducts,
        Permission::EditProducts,
        Permission::DeleteProducts,
        Permission::ViewInventory,
        Permission::AddInventoryItems,
        Permission::EditInventoryItems,
        Permission::DeleteInventoryItems,
        Permission::AdjustInventoryStock,
        Permission::ViewOrders,
        Permission::EditOrders,
        Permission::ViewCustomers,
        Permission::EditCustomers,
        Permission::ViewAdmins,
        Permission::AddAdmins,
        Permission::EditAdmins,
        Permission::ViewSiteSettings,
        Permission::EditSiteSettings,
        Permission::ViewActivityLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "VIEW_DASHBOARD",
            Permission::ViewProducts => "VIEW_PRODUCTS",
            Permission::AddProducts => "ADD_PRODUCTS",
            Permission::EditProducts => "EDIT_PRODUCTS",
            Permission::DeleteProducts => "DELETE_PRODUCTS",
            Permission::ViewInventory => "VIEW_INVENTORY",
            Permission::AddInventoryItems => "ADD_INVENTORY_ITEMS",
            Permission::EditInventoryItems => "EDIT_INVENTORY_ITEMS",
            Permission::DeleteInventoryItems => "DELETE_INVENTORY_ITEMS",
            Permission::AdjustInventoryStock => "ADJUST_INVENTORY_STOCK",
            Permission::ViewOrders => "VIEW_ORDERS",
            Permission::EditOrders => "EDIT_ORDERS",
            Permission::ViewCustomers => "VIEW_CUSTOMERS",
            Permission::EditCustomers => "EDIT_CUSTOMERS",
            Permission::ViewAdmins => "VIEW_ADMINS",
            Permission::AddAdmins => "ADD_ADMINS",
            Permission::EditAdmins => "EDIT_ADMINS",
            Permission::ViewSiteSettings => "VIEW_SITE_SETTINGS",
            Permission::EditSiteSettings => "EDIT_SITE_SETTINGS",
            Permission::ViewActivityLog => "VIEW_ACTIVITY_LOG",
        }
    }
}

/// Every permission name the privileged role must hold.
pub fn canonical_permissions() -> BTreeSet<String> {
    Permission::ALL
        .iter()
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Canonical permissions absent from `granted`, in stable order.
///
/// An empty result means the stored set already covers the canonical one and
/// nothing needs to be written.
pub fn missing_permissions(granted: &BTreeSet<String>) -> Vec<String> {
    canonical_permissions()
        .difference(granted)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_names_are_unique() {
        assert_eq!(canonical_permissions().len(), Permission::ALL.len());
    }

    #[test]
    fn missing_is_the_set_difference() {
        let granted: BTreeSet<String> = ["VIEW_ORDERS", "EDIT_ORDERS", "NOT_A_PERMISSION"]
            .into_iter()
            .map(String::from)
            .collect();
        let missing = missing_permissions(&granted);

        assert_eq!(missing.len(), Permission::ALL.len() - 2);
        assert!(!missing.contains(&"VIEW_ORDERS".to_string()));
        assert!(missing.contains(&"VIEW_DASHBOARD".to_string()));
    }

    #[test]
    fn nothing_missing_when_everything_is_granted() {
        assert!(missing_permissions(&canonical_permissions()).is_empty());
    }
}
