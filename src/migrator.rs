use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_and_employees::Migration),
            Box::new(m20240301_000002_create_orders_table::Migration),
            Box::new(m20240301_000003_create_order_tracking_tables::Migration),
            Box::new(m20240301_000004_create_ratings_tables::Migration),
            Box::new(m20240301_000005_create_system_settings_table::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    FullName,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FirstName,
    LastName,
    EmployeeType,
    IsActive,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    CustomerId,
    ItemType,
    MaterialCode,
    AssignedCutterId,
    AssignedTailorId,
    AssignedTrouserMakerId,
    AssignedShirtCutterId,
    AssignedShirtSewerId,
    HasShirt,
    TotalAmount,
    AdvanceAmount,
    StartDate,
    DueDate,
    CompletedDate,
    CurrentStatus,
    Notes,
    IsRated,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden)]
enum OrderStatusHistory {
    Table,
    Id,
    OrderId,
    Status,
    CompletedBy,
    CompletedAt,
    Notes,
}

#[derive(DeriveIden)]
enum ProcessSteps {
    Table,
    Id,
    OrderId,
    StepType,
    Title,
    Description,
    Status,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmployeeRatings {
    Table,
    Id,
    OrderId,
    EmployeeId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderRatings {
    Table,
    Id,
    OrderId,
    OverallRating,
    QualityRating,
    ServiceRating,
    TimingRating,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SystemSettings {
    Table,
    Key,
    Value,
    Description,
    UpdatedAt,
}

fn assignee_fk(name: &str, column: Orders) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(Orders::Table, column)
        .to(Employees::Table, Employees::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

mod m20240301_000001_create_customers_and_employees {
    use super::{Customers, Employees};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customers_and_employees"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::FullName).string_len(200).not_null())
                        .col(ColumnDef::new(Customers::Phone).string_len(30).null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Employees::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Employees::FirstName).string_len(100).not_null())
                        .col(ColumnDef::new(Employees::LastName).string_len(100).not_null())
                        .col(ColumnDef::new(Employees::EmployeeType).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Employees::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000002_create_orders_table {
    use super::{assignee_fk, Customers, Orders};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::ItemType).string_len(50).not_null())
                        .col(ColumnDef::new(Orders::MaterialCode).string_len(100).null())
                        .col(ColumnDef::new(Orders::AssignedCutterId).uuid().null())
                        .col(ColumnDef::new(Orders::AssignedTailorId).uuid().null())
                        .col(ColumnDef::new(Orders::AssignedTrouserMakerId).uuid().null())
                        .col(ColumnDef::new(Orders::AssignedShirtCutterId).uuid().null())
                        .col(ColumnDef::new(Orders::AssignedShirtSewerId).uuid().null())
                        .col(
                            ColumnDef::new(Orders::HasShirt)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::TotalAmount).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Orders::AdvanceAmount)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::StartDate).date().not_null())
                        .col(ColumnDef::new(Orders::DueDate).date().not_null())
                        .col(ColumnDef::new(Orders::CompletedDate).date().null())
                        .col(
                            ColumnDef::new(Orders::CurrentStatus)
                                .string_len(30)
                                .not_null()
                                .default("order_placed"),
                        )
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(
                            ColumnDef::new(Orders::IsRated)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().not_null())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(&mut assignee_fk("fk_orders_cutter", Orders::AssignedCutterId))
                        .foreign_key(&mut assignee_fk("fk_orders_tailor", Orders::AssignedTailorId))
                        .foreign_key(&mut assignee_fk(
                            "fk_orders_trouser_maker",
                            Orders::AssignedTrouserMakerId,
                        ))
                        .foreign_key(&mut assignee_fk(
                            "fk_orders_shirt_cutter",
                            Orders::AssignedShirtCutterId,
                        ))
                        .foreign_key(&mut assignee_fk(
                            "fk_orders_shirt_sewer",
                            Orders::AssignedShirtSewerId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000003_create_order_tracking_tables {
    use super::{Employees, OrderStatusHistory, Orders, ProcessSteps};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_order_tracking_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderStatusHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatusHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusHistory::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderStatusHistory::Status).string_len(30).not_null())
                        .col(ColumnDef::new(OrderStatusHistory::CompletedBy).uuid().null())
                        .col(
                            ColumnDef::new(OrderStatusHistory::CompletedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusHistory::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_status_history_order_id")
                                .from(OrderStatusHistory::Table, OrderStatusHistory::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_status_history_completed_by")
                                .from(OrderStatusHistory::Table, OrderStatusHistory::CompletedBy)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_status_history_order_status")
                        .table(OrderStatusHistory::Table)
                        .col(OrderStatusHistory::OrderId)
                        .col(OrderStatusHistory::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProcessSteps::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ProcessSteps::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(ProcessSteps::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ProcessSteps::StepType).string_len(50).not_null())
                        .col(ColumnDef::new(ProcessSteps::Title).string_len(100).not_null())
                        .col(ColumnDef::new(ProcessSteps::Description).text().not_null().default(""))
                        .col(
                            ColumnDef::new(ProcessSteps::Status)
                                .string_len(20)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(ProcessSteps::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProcessSteps::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessSteps::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_process_steps_order_id")
                                .from(ProcessSteps::Table, ProcessSteps::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_process_steps_order_id")
                        .table(ProcessSteps::Table)
                        .col(ProcessSteps::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProcessSteps::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderStatusHistory::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000004_create_ratings_tables {
    use super::{EmployeeRatings, Employees, OrderRatings, Orders};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_ratings_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EmployeeRatings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(EmployeeRatings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(EmployeeRatings::OrderId).uuid().not_null())
                        .col(ColumnDef::new(EmployeeRatings::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(EmployeeRatings::Rating).integer().not_null())
                        .col(ColumnDef::new(EmployeeRatings::Comment).text().null())
                        .col(
                            ColumnDef::new(EmployeeRatings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employee_ratings_order_id")
                                .from(EmployeeRatings::Table, EmployeeRatings::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employee_ratings_employee_id")
                                .from(EmployeeRatings::Table, EmployeeRatings::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employee_ratings_order_employee")
                        .table(EmployeeRatings::Table)
                        .col(EmployeeRatings::OrderId)
                        .col(EmployeeRatings::EmployeeId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderRatings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderRatings::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(OrderRatings::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(OrderRatings::OverallRating).integer().not_null())
                        .col(ColumnDef::new(OrderRatings::QualityRating).integer().not_null())
                        .col(ColumnDef::new(OrderRatings::ServiceRating).integer().not_null())
                        .col(ColumnDef::new(OrderRatings::TimingRating).integer().not_null())
                        .col(ColumnDef::new(OrderRatings::Comments).text().null())
                        .col(
                            ColumnDef::new(OrderRatings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_ratings_order_id")
                                .from(OrderRatings::Table, OrderRatings::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderRatings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EmployeeRatings::Table).to_owned())
                .await
        }
    }
}

mod m20240301_000005_create_system_settings_table {
    use super::SystemSettings;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_system_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SystemSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SystemSettings::Key)
                                .string_len(100)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SystemSettings::Value).text().not_null())
                        .col(ColumnDef::new(SystemSettings::Description).text().null())
                        .col(
                            ColumnDef::new(SystemSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SystemSettings::Table).to_owned())
                .await
        }
    }
}
