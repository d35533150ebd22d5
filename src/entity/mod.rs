pub mod audit_logs;
pub mod categories;
pub mod inventory_categories;
pub mod inventory_items;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod recipe_ingredients;
pub mod role_permissions;
pub mod roles;
pub mod units_of_measure;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use inventory_categories::Entity as InventoryCategories;
pub use inventory_items::Entity as InventoryItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use recipe_ingredients::Entity as RecipeIngredients;
pub use role_permissions::Entity as RolePermissions;
pub use roles::Entity as Roles;
pub use units_of_measure::Entity as UnitsOfMeasure;
pub use users::Entity as Users;
