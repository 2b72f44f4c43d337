use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;

use crate::model::{CatalogEntry, MealPlan, Recipe, Session, User};
use crate::social::{LikeAction, Relation, SocialState};

/// Entity kinds that carry [`SocialState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialTarget {
    Recipe,
    MealPlan,
}

/// Document store for users, sessions, recipes, meal plans and the catalog.
///
/// Lookups return `Ok(None)` for absent documents; `Err` is reserved for I/O
/// and decoding failures.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns `false` without writing when the email is already registered.
    async fn create_user(&self, user: &User) -> anyhow::Result<bool>;
    async fn get_user(&self, user_id: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn put_session(&self, session: &Session) -> anyhow::Result<()>;
    async fn get_session(&self, token_hash: &str) -> anyhow::Result<Option<Session>>;
    async fn delete_session(&self, token_hash: &str) -> anyhow::Result<()>;

    async fn insert_recipe(&self, recipe: &Recipe) -> anyhow::Result<()>;
    async fn get_recipe(&self, recipe_id: &str) -> anyhow::Result<Option<Recipe>>;
    async fn list_recipes(&self) -> anyhow::Result<Vec<Recipe>>;

    async fn insert_meal_plan(&self, plan: &MealPlan) -> anyhow::Result<()>;
    async fn get_meal_plan(&self, plan_id: &str) -> anyhow::Result<Option<MealPlan>>;

    async fn insert_catalog_entry(&self, entry: &CatalogEntry) -> anyhow::Result<()>;
    async fn get_catalog_entry(&self, entry_id: &str) -> anyhow::Result<Option<CatalogEntry>>;
    async fn list_catalog(&self) -> anyhow::Result<Vec<CatalogEntry>>;

    /// Sets (`Some`) or flips (`None`) the user's membership in `relation` and
    /// returns the updated state, or `None` when the entity does not exist.
    async fn update_social(
        &self,
        target: SocialTarget,
        entity_id: &str,
        relation: Relation,
        user_id: &str,
        desired: Option<bool>,
    ) -> anyhow::Result<Option<SocialState>>;

    /// Sets (`Some`) or flips (`None`) the user's save of an entity, updating
    /// the entity's `savedBy` and the user's saved list in one step. Returns
    /// whether the entity is now saved, or `None` when the user is unknown or
    /// the entity is missing. Unsaving a missing entity still clears the
    /// user's list.
    async fn update_saved(
        &self,
        target: SocialTarget,
        entity_id: &str,
        user_id: &str,
        desired: Option<bool>,
    ) -> anyhow::Result<Option<bool>>;

    async fn adjust_catalog_likes(
        &self,
        entry_id: &str,
        action: LikeAction,
    ) -> anyhow::Result<Option<CatalogEntry>>;
}

const USERS: &str = "users";
const SESSIONS: &str = "sessions";
const RECIPES: &str = "recipes";
const MEAL_PLANS: &str = "meal_plans";
const CATALOG: &str = "catalog";

/// One pretty-printed JSON file per document: `<base>/<collection>/<id>.json`.
///
/// Read-modify-write operations hold a store-wide lock so concurrent toggles
/// within one process never lose updates.
#[derive(Debug)]
pub struct LocalFsStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.base_dir.join(collection)
    }

    /// `None` for ids that cannot name a document (path separators, dots, ...).
    fn doc_path(&self, collection: &str, id: &str) -> Option<PathBuf> {
        if !is_valid_id(id) {
            return None;
        }
        Some(self.collection_dir(collection).join(format!("{id}.json")))
    }

    /// Read-modify-write of an entity's social state; callers hold `write_lock`.
    async fn apply_social(
        &self,
        target: SocialTarget,
        entity_id: &str,
        relation: Relation,
        user_id: &str,
        desired: Option<bool>,
    ) -> anyhow::Result<Option<SocialState>> {
        let apply = |social: &mut SocialState| match desired {
            Some(member) => social.set(relation, user_id, member),
            None => social.toggle(relation, user_id),
        };

        match target {
            SocialTarget::Recipe => {
                let Some(mut recipe) = self.get_recipe(entity_id).await? else {
                    return Ok(None);
                };
                apply(&mut recipe.social);
                self.insert_recipe(&recipe).await?;
                Ok(Some(recipe.social))
            }
            SocialTarget::MealPlan => {
                let Some(mut plan) = self.get_meal_plan(entity_id).await? else {
                    return Ok(None);
                };
                apply(&mut plan.social);
                self.insert_meal_plan(&plan).await?;
                Ok(Some(plan.social))
            }
        }
    }

    async fn get_doc<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> anyhow::Result<Option<T>> {
        let Some(path) = self.doc_path(collection, id) else {
            return Ok(None);
        };
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }

    async fn put_doc<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> anyhow::Result<()> {
        let path = self
            .doc_path(collection, id)
            .ok_or_else(|| anyhow::anyhow!("invalid document id: {id:?}"))?;
        write_json_atomic(&path, doc)
            .await
            .with_context(|| format!("write {collection}/{id}"))
    }

    async fn list_docs<T: DeserializeOwned>(&self, collection: &str) -> anyhow::Result<Vec<T>> {
        let dir = self.collection_dir(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("read dir: {}", dir.display()));
            }
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("read dir: {}", dir.display()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // A document removed between listing and reading is skipped.
            if let Some(doc) = read_json(&path)
                .await
                .with_context(|| format!("read: {}", path.display()))?
            {
                docs.push(doc);
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl Store for LocalFsStore {
    async fn create_user(&self, user: &User) -> anyhow::Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Ok(false);
        }
        self.put_doc(USERS, &user.id, user).await?;
        Ok(true)
    }

    async fn get_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        self.get_doc(USERS, user_id).await
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let email = email.trim();
        let users: Vec<User> = self.list_docs(USERS).await?;
        Ok(users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    async fn put_session(&self, session: &Session) -> anyhow::Result<()> {
        self.put_doc(SESSIONS, &session.token_hash, session).await
    }

    async fn get_session(&self, token_hash: &str) -> anyhow::Result<Option<Session>> {
        self.get_doc(SESSIONS, token_hash).await
    }

    async fn delete_session(&self, token_hash: &str) -> anyhow::Result<()> {
        let Some(path) = self.doc_path(SESSIONS, token_hash) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove: {}", path.display())),
        }
    }

    async fn insert_recipe(&self, recipe: &Recipe) -> anyhow::Result<()> {
        self.put_doc(RECIPES, &recipe.id, recipe).await
    }

    async fn get_recipe(&self, recipe_id: &str) -> anyhow::Result<Option<Recipe>> {
        self.get_doc(RECIPES, recipe_id).await
    }

    async fn list_recipes(&self) -> anyhow::Result<Vec<Recipe>> {
        let mut recipes: Vec<Recipe> = self.list_docs(RECIPES).await?;
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(recipes)
    }

    async fn insert_meal_plan(&self, plan: &MealPlan) -> anyhow::Result<()> {
        self.put_doc(MEAL_PLANS, &plan.id, plan).await
    }

    async fn get_meal_plan(&self, plan_id: &str) -> anyhow::Result<Option<MealPlan>> {
        self.get_doc(MEAL_PLANS, plan_id).await
    }

    async fn insert_catalog_entry(&self, entry: &CatalogEntry) -> anyhow::Result<()> {
        self.put_doc(CATALOG, &entry.id, entry).await
    }

    async fn get_catalog_entry(&self, entry_id: &str) -> anyhow::Result<Option<CatalogEntry>> {
        self.get_doc(CATALOG, entry_id).await
    }

    async fn list_catalog(&self) -> anyhow::Result<Vec<CatalogEntry>> {
        let mut entries: Vec<CatalogEntry> = self.list_docs(CATALOG).await?;
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn update_social(
        &self,
        target: SocialTarget,
        entity_id: &str,
        relation: Relation,
        user_id: &str,
        desired: Option<bool>,
    ) -> anyhow::Result<Option<SocialState>> {
        let _guard = self.write_lock.lock().await;
        self.apply_social(target, entity_id, relation, user_id, desired)
            .await
    }

    async fn update_saved(
        &self,
        target: SocialTarget,
        entity_id: &str,
        user_id: &str,
        desired: Option<bool>,
    ) -> anyhow::Result<Option<bool>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        let social = self
            .apply_social(target, entity_id, Relation::Save, user_id, desired)
            .await?;
        let saved = match (social, desired) {
            (Some(social), _) => social.contains(Relation::Save, user_id),
            (None, Some(false)) => false,
            (None, _) => return Ok(None),
        };

        let ids = match target {
            SocialTarget::Recipe => &mut user.saved_recipes,
            SocialTarget::MealPlan => &mut user.saved_meal_plans,
        };
        let present = ids.iter().any(|id| id == entity_id);
        if saved != present {
            if saved {
                ids.push(entity_id.to_owned());
            } else {
                ids.retain(|id| id != entity_id);
            }
            self.put_doc(USERS, &user.id, &user).await?;
        }
        Ok(Some(saved))
    }

    async fn adjust_catalog_likes(
        &self,
        entry_id: &str,
        action: LikeAction,
    ) -> anyhow::Result<Option<CatalogEntry>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut entry) = self.get_catalog_entry(entry_id).await? else {
            return Ok(None);
        };
        entry.likes = action.apply(entry.likes);
        self.insert_catalog_entry(&entry).await?;
        Ok(Some(entry))
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
