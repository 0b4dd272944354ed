//! Namespace Accessors
//!
//! Fixed-namespace views over the [`CacheManager`] so call sites don't repeat
//! namespace names or TTLs. They hold no state of their own.
//!
//! | Namespace      | Default TTL         | Content                         |
//! |----------------|---------------------|---------------------------------|
//! | `appointments` | [`Ttl::SHORT`]      | live availability, bookings     |
//! | `doctors`      | [`Ttl::LONG`]       | doctor directory                |
//! | `blog`         | [`Ttl::VERY_LONG`]  | posts, keyed by slug            |
//! | `user`         | [`Ttl::MEDIUM`]     | profile, preferences            |
//! | `reports`      | [`Ttl::MEDIUM`]     | generated reports               |
//! | `settings`     | [`Ttl::VERY_LONG`]  | portal settings                 |
//! | `categories`   | [`Ttl::WEEK`]       | content taxonomies              |

use std::ops::Deref;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::cache::{CacheManager, ClearOutcome};
use crate::error::Result;

// == TTL Constants ==
/// Named cache lifetimes.
pub struct Ttl;

impl Ttl {
    pub const SHORT: Duration = Duration::from_secs(5 * 60);
    pub const MEDIUM: Duration = Duration::from_secs(15 * 60);
    pub const LONG: Duration = Duration::from_secs(60 * 60);
    pub const VERY_LONG: Duration = Duration::from_secs(24 * 60 * 60);
    pub const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);
}

// == Namespace Names ==
pub mod names {
    pub const APPOINTMENTS: &str = "appointments";
    pub const DOCTORS: &str = "doctors";
    pub const BLOG: &str = "blog";
    pub const USER: &str = "user";
    pub const REPORTS: &str = "reports";
    pub const SETTINGS: &str = "settings";
    pub const CATEGORIES: &str = "categories";
}

// == Namespace Cache ==
/// A [`CacheManager`] pinned to one namespace with a default TTL.
pub struct NamespaceCache<'a, T> {
    manager: &'a CacheManager<T>,
    namespace: &'static str,
    default_ttl: Duration,
}

impl<'a, T> NamespaceCache<'a, T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(manager: &'a CacheManager<T>, namespace: &'static str, default_ttl: Duration) -> Self {
        Self {
            manager,
            namespace,
            default_ttl,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn get<P>(&self, key: &str, params: &P) -> Result<Option<T>>
    where
        P: Serialize + ?Sized,
    {
        self.manager.get(self.namespace, key, params)
    }

    /// Stores with the namespace's default TTL.
    pub fn set<P>(&self, key: &str, data: T, params: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        self.manager
            .set(self.namespace, key, data, params, self.default_ttl)
    }

    pub fn set_with_ttl<P>(&self, key: &str, data: T, params: &P, ttl: Duration) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        self.manager.set(self.namespace, key, data, params, ttl)
    }

    pub fn delete<P>(&self, key: &str, params: &P) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        self.manager.delete(self.namespace, key, params)
    }

    pub fn clear(&self) -> Result<ClearOutcome> {
        self.manager.clear_namespace(self.namespace)
    }
}

// == Blog Cache ==
/// Blog namespace with slug-keyed post helpers.
pub struct BlogCache<'a, T>(NamespaceCache<'a, T>);

const POST_KEY: &str = "post";

impl<'a, T> BlogCache<'a, T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn get_post(&self, slug: &str) -> Result<Option<T>> {
        self.0.get(POST_KEY, &json!({ "slug": slug }))
    }

    pub fn set_post(&self, slug: &str, post: T) -> Result<()> {
        self.0.set(POST_KEY, post, &json!({ "slug": slug }))
    }

    pub fn delete_post(&self, slug: &str) -> Result<()> {
        self.0.delete(POST_KEY, &json!({ "slug": slug }))
    }
}

impl<'a, T> Deref for BlogCache<'a, T> {
    type Target = NamespaceCache<'a, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// == Manager Accessors ==
impl<T> CacheManager<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Live availability and appointment lists.
    pub fn appointments(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::APPOINTMENTS, Ttl::SHORT)
    }

    /// Doctor directory.
    pub fn doctors(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::DOCTORS, Ttl::LONG)
    }

    pub fn blog(&self) -> BlogCache<'_, T> {
        BlogCache(NamespaceCache::new(self, names::BLOG, Ttl::VERY_LONG))
    }

    pub fn user(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::USER, Ttl::MEDIUM)
    }

    pub fn reports(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::REPORTS, Ttl::MEDIUM)
    }

    pub fn settings(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::SETTINGS, Ttl::VERY_LONG)
    }

    pub fn categories(&self) -> NamespaceCache<'_, T> {
        NamespaceCache::new(self, names::CATEGORIES, Ttl::WEEK)
    }
}
