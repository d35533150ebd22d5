use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub category_id: Uuid,
    pub unit_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub current_stock: Decimal,
    /// Minor units (centavos) per unit of measure.
    pub cost_per_unit: i64,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))", nullable)]
    pub low_stock_threshold: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_categories::Entity",
        from = "Column::CategoryId",
        to = "super::inventory_categories::Column::Id"
    )]
    InventoryCategories,
    #[sea_orm(
        belongs_to = "super::units_of_measure::Entity",
        from = "Column::UnitId",
        to = "super::units_of_measure::Column::Id"
    )]
    UnitsOfMeasure,
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
}

impl Related<super::inventory_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryCategories.def()
    }
}

impl Related<super::units_of_measure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnitsOfMeasure.def()
    }
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
