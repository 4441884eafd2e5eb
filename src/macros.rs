/// Implement [`FromRow`](crate::results::FromRow) and
/// [`Entity`](crate::metadata::Entity) for a plain struct.
///
/// Each mapped field may carry a bracketed list of
/// [`ColumnMetadata`](crate::metadata::ColumnMetadata) builder calls. Fields
/// listed under `not_mapped` are left out of SQL and filled with
/// `Default::default()` when a row is decoded.
///
/// ```rust
/// use sql_access::prelude::*;
///
/// #[derive(Debug, Default)]
/// struct Order {
///     id: i64,
///     customer: String,
///     total: f64,
///     note: Option<String>,
///     display_name: String,
/// }
///
/// sql_access::entity! {
///     Order => "orders" in "sales" {
///         id: [column_name("order_id"), key, identity],
///         customer: [required, max_length(80)],
///         total,
///         note,
///     }
///     not_mapped { display_name }
/// }
///
/// let meta = Order::metadata();
/// assert_eq!(meta.qualified_table(Provider::Mssql.dialect()), "[sales].[orders]");
/// assert_eq!(meta.insert_columns().count(), 3);
/// ```
#[macro_export]
macro_rules! entity {
    (
        $entity:ident => $table:literal $( in $schema:literal )? {
            $(
                $field:ident $( : [ $( $attr:ident $( ( $( $arg:expr ),* ) )? ),* $(,)? ] )?
            ),* $(,)?
        }
        $( not_mapped { $( $skip:ident ),* $(,)? } )?
    ) => {
        impl $crate::results::FromRow for $entity {
            fn from_row(
                row: &$crate::results::DbRow,
            ) -> ::std::result::Result<Self, $crate::error::DataAccessError> {
                let meta = <Self as $crate::metadata::Entity>::metadata();
                ::std::result::Result::Ok(Self {
                    $( $field: row.try_get(meta.column_name_for(stringify!($field)))?, )*
                    $( $( $skip: ::std::default::Default::default(), )* )?
                })
            }
        }

        impl $crate::metadata::Entity for $entity {
            fn metadata() -> &'static $crate::metadata::EntityMetadata {
                static METADATA: ::std::sync::LazyLock<$crate::metadata::EntityMetadata> =
                    ::std::sync::LazyLock::new(|| {
                        $crate::metadata::EntityMetadata::new($table)
                            $( .schema($schema) )?
                            $(
                                .column(
                                    $crate::metadata::ColumnMetadata::new(stringify!($field))
                                        $( $( .$attr( $( $( $arg ),* )? ) )* )?
                                )
                            )*
                            $( $(
                                .column(
                                    $crate::metadata::ColumnMetadata::new(stringify!($skip))
                                        .not_mapped()
                                )
                            )* )?
                    });
                &METADATA
            }

            fn values(&self) -> ::std::vec::Vec<$crate::types::DbValue> {
                ::std::vec![
                    $( $crate::types::DbValue::from(::std::clone::Clone::clone(&self.$field)) ),*
                ]
            }
        }
    };
}
