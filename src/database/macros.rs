/// Defines a method to query the database using SurrealQL.
///
/// # Syntax
/// ```text
/// [Base Type] > method_name(...arguments) > [Output Type] where "sql query"
/// [Base Type] > method_name(...arguments) where "sql statement"
/// ```
/// Where the `Base Type` is the type that the method is being defined for and the `Output Type` is what the first statement deserializes into.
/// Every argument is bound under its own name. Without an output type the statement only runs for its side effects.
///
/// # Example
///
/// ```rust,ignore
/// define_relation! {
///     QrCode > by_company(company_id: &str) > Vec<QrCode>
///         where "SELECT * FROM qr_codes WHERE company_id = $company_id"
/// }
///
/// let codes = QrCode::by_company(&company_id, &db).await?;
/// ```
#[macro_export]
macro_rules! define_relation {
    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) > $export:ty where $query:literal) => {
        impl $model {
            #[tracing::instrument(skip_all)]
            pub async fn $relation(
                $($binding : $binding_type ,)* db: &$crate::database::Database,
            ) -> ::std::result::Result<$export, $crate::database::DatabaseQueryError> {
                db.sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .fetch()
                    .await
            }
        }
    };

    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) where $query:literal) => {
        impl $model {
            #[tracing::instrument(skip_all)]
            pub async fn $relation(
                $($binding : $binding_type ,)* db: &$crate::database::Database,
            ) -> ::std::result::Result<(), $crate::database::DatabaseQueryError> {
                db.sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .execute()
                    .await
            }
        }
    };
}
