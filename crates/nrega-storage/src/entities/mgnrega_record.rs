use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mgnrega_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub state_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub district_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub fin_year: String,
    pub families_given_work: i64,
    /// Mapped from the upstream `Total_Individuals_Worked` field. The
    /// upstream name suggests a head count of individuals, not person-days;
    /// the upstream semantic is stored unchanged.
    pub total_work_days: i64,
    pub total_wages_paid: f64,
    pub payments_on_time_percent: f64,
    /// Verbatim upstream record as JSON text, audit-only.
    pub raw_api_record: String,
    pub last_updated_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
