//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. It also seeds
//! the role groups and the optional bootstrap administrator on startup.

use crate::{
    config::settings::AdminConfig,
    core::{account, group::Role},
    entities::{AuthToken, Cart, Group, MenuItem, Order, OrderItem, User, UserGroup},
    errors::Result,
};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::TableCreateStatement,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default database location used when neither config.toml nor `DATABASE_URL` name one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/restaurant.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_parent(database_url) {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Directory holding an on-disk `SQLite` database, if the URL names one.
fn sqlite_file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

/// Creates all tables that do not exist yet.
///
/// Referenced tables are created before the tables pointing at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, User),
        table_for(&schema, Group),
        table_for(&schema, UserGroup),
        table_for(&schema, AuthToken),
        table_for(&schema, MenuItem),
        table_for(&schema, Cart),
        table_for(&schema, Order),
        table_for(&schema, OrderItem),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    info!("Database tables ensured.");
    Ok(())
}

/// Makes sure every role group exists and creates the configured administrator.
///
/// Safe to run on every startup.
#[instrument(skip(db, admin))]
pub async fn seed(db: &DatabaseConnection, admin: Option<&AdminConfig>) -> Result<()> {
    for role in Role::ALL {
        crate::core::group::ensure_group(db, role).await?;
    }

    if let Some(admin) = admin {
        if account::get_user_by_username(db, &admin.username)
            .await?
            .is_none()
        {
            let user = account::create_user(
                db,
                &admin.username,
                &admin.email,
                &admin.password,
                true,
            )
            .await?;
            info!("Created bootstrap administrator '{}' (ID: {})", user.username, user.id);
        } else {
            debug!("Administrator '{}' already exists", admin.username);
        }
    }

    Ok(())
}
