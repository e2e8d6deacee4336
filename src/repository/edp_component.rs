use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::edp_component::EDPComponent;

const UPSERT_COMPONENT: &str = "insert into {schema}.edp_component(type, url, icon, visible) values ($1, $2, $3, $4) \
    on conflict (type) do update set url = excluded.url, icon = excluded.icon, visible = excluded.visible \
    returning id;";

pub async fn upsert(
    conn: &mut PgConnection,
    schema: &Schema,
    component: &EDPComponent,
) -> Result<i32> {
    let sql = schema.render(UPSERT_COMPONENT);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&component.type_)
        .bind(&component.url)
        .bind(&component.icon)
        .bind(component.visible)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}
