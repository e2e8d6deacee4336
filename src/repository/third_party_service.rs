use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::third_party_service::ThirdPartyService;

const SELECT_SERVICE: &str = "select id from {schema}.third_party_service where name = $1;";
const INSERT_SERVICE: &str = "insert into {schema}.third_party_service(name, description, version, url, icon) \
    values ($1, $2, $3, $4, $5) returning id;";

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_SERVICE, name).await
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    service: &ThirdPartyService,
) -> Result<i32> {
    let sql = schema.render(INSERT_SERVICE);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.version)
        .bind(&service.url)
        .bind(&service.icon)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}
