use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use crate::db::fixture::Fixture;
use crate::db::memory::MemoryRepository;
use crate::db::pg::PgRepository;
use crate::db::{self, ErrorKind, Result, SharedRepository};

const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: Backend,
    pub database_url: Option<String>,
    pub pool_size: u32,
}

impl Settings {
    /// Reads settings from the environment after loading `.env` and, when
    /// `NEWS_API_ENV` names one, the matching `.env.<name>` file.
    pub fn from_env() -> Result<Settings> {
        if let Ok(name) = env::var("NEWS_API_ENV") {
            dotenv::from_filename(format!(".env.{}", name)).ok();
        }
        dotenv().ok();
        Settings::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match var("NEWS_API_BACKEND").as_deref() {
            None | Some("postgres") => Backend::Postgres,
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(ErrorKind::Config(format!("unknown backend {:?}", other)).into())
            }
        };

        let database_url = var("DATABASE_URL");
        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ErrorKind::Config("DATABASE_URL must be set".to_string()).into());
        }

        let pool_size = match var("DATABASE_POOL_SIZE") {
            Some(size) => size.trim().parse::<u32>()?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err(ErrorKind::Config("DATABASE_POOL_SIZE must be positive".to_string()).into());
        }

        Ok(Settings {
            backend,
            database_url,
            pool_size,
        })
    }

    /// Opens the configured backend, migrating Postgres before first use.
    pub fn repository(&self) -> Result<SharedRepository> {
        match (self.backend, &self.database_url) {
            (Backend::Postgres, Some(url)) => {
                let repository = PgRepository::new(db::init_pool(url, self.pool_size)?);
                repository.run_migrations()?;
                Ok(Arc::new(repository))
            }
            (Backend::Postgres, None) => {
                Err(ErrorKind::Config("DATABASE_URL must be set".to_string()).into())
            }
            (Backend::Memory, _) => {
                let fixture = Fixture::bundled()
                    .map_err(|e| ErrorKind::Config(format!("bundled fixture: {}", e)))?;
                Ok(Arc::new(MemoryRepository::seeded(&fixture)))
            }
        }
    }
}
