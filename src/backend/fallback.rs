//! Content loading with built-in defaults.
//!
//! Public views stay populated when the backend is unreachable or a table is
//! empty: the caller gets default records plus the classified notice to show.

use uuid::Uuid;

use crate::backend::client::BackendClient;
use crate::backend::errors::{classify, ErrorReport};
use crate::backend::query::Query;
use crate::backend::records::{Banner, Record, Statistic};
use crate::transport::Transport;

/// Records ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<R> {
    pub records: Vec<R>,
    /// Classified error message, when loading failed.
    pub notice: Option<String>,
    /// True when `records` are the built-in defaults.
    pub from_fallback: bool,
}

/// Records with a built-in default set.
pub trait FallbackContent: Record {
    fn fallback() -> Vec<Self>;
}

impl FallbackContent for Banner {
    fn fallback() -> Vec<Self> {
        vec![Banner {
            id: Uuid::nil(),
            title: "Welcome to Maranatha Biblical Seminary".to_string(),
            subtitle: Some(
                "Empowering future leaders with biblical wisdom and practical ministry skills".to_string(),
            ),
            image_url: "https://images.unsplash.com/photo-1519681393784-d120267933ba?ixlib=rb-1.2.1&auto=format&fit=crop&w=1950&q=80".to_string(),
            button_text: Some("Explore Programs".to_string()),
            button_link: Some("/courses".to_string()),
            active: true,
            order_index: 0,
        }]
    }
}

impl FallbackContent for Statistic {
    fn fallback() -> Vec<Self> {
        [
            ("Graduates", 1000, "GraduationCap"),
            ("Current Students", 500, "Users"),
            ("Courses", 50, "BookOpen"),
            ("Countries", 25, "Globe"),
        ]
        .into_iter()
        .map(|(title, value, icon)| Statistic {
            id: Uuid::nil(),
            title: title.to_string(),
            value,
            icon_name: Some(icon.to_string()),
            created_at: None,
        })
        .collect()
    }
}

/// Load rows; on failure return no rows and the classified notice.
pub async fn load<R, T>(client: &BackendClient<T>, query: &Query) -> Loaded<R>
where
    R: Record,
    T: Transport,
{
    match client.select::<R>(query).await {
        Ok(records) => Loaded {
            records,
            notice: None,
            from_fallback: false,
        },
        Err(e) => Loaded {
            records: Vec::new(),
            notice: Some(classify(&ErrorReport::from(&e)).message),
            from_fallback: false,
        },
    }
}

/// Load rows, substituting the defaults when loading fails or returns nothing.
pub async fn load_or_default<R, T>(client: &BackendClient<T>, query: &Query) -> Loaded<R>
where
    R: FallbackContent,
    T: Transport,
{
    let loaded = load::<R, T>(client, query).await;
    if !loaded.records.is_empty() {
        return loaded;
    }

    tracing::info!(table = R::TABLE, failed = loaded.notice.is_some(), "Using default content");
    Loaded {
        records: R::fallback(),
        notice: loaded.notice,
        from_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::errors::MSG_NETWORK;
    use crate::resilience::{RetrySettings, RetryingTransport};
    use crate::transport::scripted::{ScriptedTransport, Step};

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_backend_falls_back_with_notice() {
        let steps = (0..4).map(|_| Step::network()).collect();
        let transport = RetryingTransport::new(
            ScriptedTransport::new().script("/rest/v1/banners", steps),
            RetrySettings::default(),
        );
        let client = BackendClient::new(transport, "https://project.supabase.co", "anon").unwrap();

        let loaded: Loaded<Banner> = load_or_default(&client, &Query::new().eq("active", true)).await;

        assert!(loaded.from_fallback);
        assert_eq!(loaded.records, Banner::fallback());
        assert_eq!(loaded.notice.as_deref(), Some(MSG_NETWORK));
    }

    #[tokio::test]
    async fn test_empty_table_uses_defaults_without_notice() {
        let client = BackendClient::new(ScriptedTransport::new(), "https://project.supabase.co", "anon").unwrap();

        let loaded: Loaded<Statistic> = load_or_default(&client, &Query::new()).await;

        assert!(loaded.from_fallback);
        assert_eq!(loaded.records.len(), 4);
        assert_eq!(loaded.records[0].title, "Graduates");
        assert_eq!(loaded.notice, None);
    }

    #[tokio::test]
    async fn test_loaded_rows_are_kept() {
        let row = r#"[{"id":"9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d","title":"Alumni","value":1200,"icon_name":"Users"}]"#;
        let client = BackendClient::new(
            ScriptedTransport::new().script("/rest/v1/statistics", vec![Step::ok(row)]),
            "https://project.supabase.co",
            "anon",
        )
        .unwrap();

        let loaded: Loaded<Statistic> = load_or_default(&client, &Query::new()).await;

        assert!(!loaded.from_fallback);
        assert_eq!(loaded.records[0].value, 1200);
    }

    #[tokio::test]
    async fn test_load_without_defaults_reports_notice() {
        let client = BackendClient::new(
            ScriptedTransport::new().script("/rest/v1/videos", vec![Step::Respond(400, r#"{"code":"42703","message":"column videos.rank does not exist"}"#.into())]),
            "https://project.supabase.co",
            "anon",
        )
        .unwrap();

        let loaded: Loaded<crate::backend::records::Video> = load(&client, &Query::new()).await;

        assert!(loaded.records.is_empty());
        assert_eq!(loaded.notice.as_deref(), Some("column videos.rank does not exist"));
    }
}
