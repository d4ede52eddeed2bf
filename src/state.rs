use crate::{
    config::RuntimeConfiguration,
    data::{StudentStore, postgres::PgStudentStore},
    error::RosterResult,
};
use maud::{DOCTYPE, Markup, html};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct RosterState {
    store: Arc<dyn StudentStore>,
}

impl RosterState {
    pub async fn new(options: PgPoolOptions, config: &RuntimeConfiguration) -> RosterResult<Self> {
        let store =
            PgStudentStore::connect(options, &config.db_config().get_db_path()).await?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: impl StudentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Students" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center py-8 text-white" {
                    (markup)
                }
            }
        }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
    }
}

impl Deref for RosterState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        &*self.store
    }
}
