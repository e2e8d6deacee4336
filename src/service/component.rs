use sqlx::PgPool;
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Result, ResultExt};
use crate::model::edp_component::EDPComponent;
use crate::model::third_party_service::ThirdPartyService;
use crate::repository::{edp_component, third_party_service};

#[derive(Clone)]
pub struct EDPComponentService {
    pool: PgPool,
}

impl EDPComponentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn put(&self, schema: &Schema, component: &EDPComponent) -> Result<i32> {
        let mut tx = self.pool.begin().await?;
        let id = edp_component::upsert(&mut tx, schema, component)
            .await
            .context(|| format!("couldn't put edp component {}", component.type_))?;
        tx.commit().await?;
        event!(Level::INFO, component = %component.type_, id, "EDP component has been saved.");
        Ok(id)
    }
}

#[derive(Clone)]
pub struct ThirdPartyServiceService {
    pool: PgPool,
}

impl ThirdPartyServiceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers the service once. Later changes to the resource are not
    /// mirrored.
    pub async fn put(&self, service: &ThirdPartyService) -> Result<i32> {
        let schema = &service.tenant;
        let mut tx = self.pool.begin().await?;
        let id = match third_party_service::select_id(&mut tx, schema, &service.name).await? {
            Some(id) => {
                event!(Level::DEBUG, service = %service.name, id, "Third party service already exists.");
                id
            }
            None => {
                let id = third_party_service::insert(&mut tx, schema, service)
                    .await
                    .context(|| format!("couldn't put third party service {}", service.name))?;
                event!(Level::INFO, service = %service.name, id, "Third party service has been created.");
                id
            }
        };
        tx.commit().await?;
        Ok(id)
    }
}
