//! Categories, parameters and products

use crate::{
    conversion_error, id_to_bytes, map_unique, now_millis, row_id, row_u64, SqliteStore,
    StoreError,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use tierforge_domain::traits::ProductCatalog;
use tierforge_domain::{
    Category, ParameterDefinition, ParameterKind, ParameterValue, Product, ProductRef, RecordId,
    Resource,
};

/// Input for [`SqliteStore::add_product`]
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Category the product is added to
    pub category_id: RecordId,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional image location
    pub image_url: Option<String>,
    /// Raw `(parameter name, value)` pairs, coerced against the category's
    /// attached parameters
    pub values: Vec<(String, String)>,
}

/// Changes for [`SqliteStore::update_product`]; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New image location
    pub image_url: Option<String>,
    /// Raw `(parameter name, value)` pairs to set
    pub values: Vec<(String, String)>,
    /// Parameter names whose values are removed
    pub unset: Vec<String>,
}

/// Changes for [`SqliteStore::update_parameter`]; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ParameterUpdate {
    /// New name, unique per owner
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New kind; product values that no longer fit are dropped
    pub kind: Option<ParameterKind>,
}

const CATEGORY_COLUMNS: &str = "id, user_id, name, description, created_at";
const PARAMETER_COLUMNS: &str = "id, user_id, name, description, parameter_type, options";
const PRODUCT_COLUMNS: &str =
    "id, user_id, category_id, name, description, image_url, parameter_values, created_at";

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row_id(row, 0)?,
        owner: row_id(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row_u64(row, 4)?,
    })
}

fn parameter_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ParameterDefinition> {
    let type_name: String = row.get(4)?;
    let options: Option<String> = row.get(5)?;
    let options: Vec<String> = match options {
        Some(json) => serde_json::from_str(&json).map_err(|e| conversion_error(5, e))?,
        None => Vec::new(),
    };
    let kind = ParameterKind::from_parts(&type_name, options).map_err(|e| conversion_error(4, e))?;

    Ok(ParameterDefinition {
        id: row_id(row, 0)?,
        owner: row_id(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        kind,
    })
}

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    let values: String = row.get(6)?;
    let parameter_values: BTreeMap<String, ParameterValue> =
        serde_json::from_str(&values).map_err(|e| conversion_error(6, e))?;

    Ok(Product {
        id: row_id(row, 0)?,
        owner: row_id(row, 1)?,
        category_id: row_id(row, 2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        image_url: row.get(5)?,
        parameter_values,
        created_at: row_u64(row, 7)?,
    })
}

/// Coerce raw pairs against `parameters` (names matched ignoring case)
fn apply_values(
    parameters: &[ParameterDefinition],
    raw_values: &[(String, String)],
    values: &mut BTreeMap<String, ParameterValue>,
) -> Result<(), StoreError> {
    for (key, raw) in raw_values {
        let parameter = find_parameter(parameters, key)?;
        values.insert(parameter.name.clone(), parameter.coerce(raw)?);
    }
    Ok(())
}

fn find_parameter<'a>(
    parameters: &'a [ParameterDefinition],
    key: &str,
) -> Result<&'a ParameterDefinition, StoreError> {
    let key = key.trim();
    parameters
        .iter()
        .find(|p| p.name.to_lowercase() == key.to_lowercase())
        .ok_or_else(|| {
            StoreError::InvalidData(format!(
                "Parameter '{}' is not attached to this category",
                key
            ))
        })
}

fn require_name(name: &str, what: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidData(format!("{} name cannot be empty", what)));
    }
    Ok(name.to_string())
}

impl SqliteStore {
    /// Create a category (plan-checked)
    pub fn create_category(
        &mut self,
        owner: RecordId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, StoreError> {
        let name = require_name(name, "Category")?;
        self.enforce_limit(owner, Resource::Categories)?;

        let category = Category {
            id: RecordId::new(),
            owner,
            name,
            description: description.map(str::to_string),
            created_at: now_millis(),
        };

        self.conn.execute(
            "INSERT INTO categories (id, user_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id_to_bytes(category.id),
                id_to_bytes(owner),
                &category.name,
                &category.description,
                category.created_at as i64,
            ],
        )?;

        tracing::info!(category = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: RecordId) -> Result<Option<Category>, StoreError> {
        let category = self
            .conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
                params![id_to_bytes(id)],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    /// Categories of `owner`, by name
    pub fn list_categories(&self, owner: RecordId) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, rowid",
            CATEGORY_COLUMNS
        ))?;
        let categories = stmt
            .query_map(params![id_to_bytes(owner)], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Fetch a category that must belong to `owner`
    pub(crate) fn owned_category(
        &self,
        owner: RecordId,
        id: RecordId,
    ) -> Result<Category, StoreError> {
        let category = self
            .get_category(id)?
            .ok_or_else(|| StoreError::NotFound(format!("category {}", id)))?;
        if category.owner != owner {
            return Err(StoreError::Forbidden(format!("category {} belongs to another user", id)));
        }
        Ok(category)
    }

    /// Rename or redescribe a category
    pub fn update_category(
        &mut self,
        owner: RecordId,
        id: RecordId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, StoreError> {
        let mut category = self.owned_category(owner, id)?;
        if let Some(name) = name {
            category.name = require_name(name, "Category")?;
        }
        if let Some(description) = description {
            category.description = Some(description.to_string());
        }

        self.conn.execute(
            "UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3",
            params![&category.name, &category.description, id_to_bytes(id)],
        )?;
        tracing::info!(category = %id, name = %category.name, "Updated category");
        Ok(category)
    }

    /// Delete a category with its products and tier lists
    pub fn delete_category(&mut self, owner: RecordId, id: RecordId) -> Result<(), StoreError> {
        self.owned_category(owner, id)?;
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id_to_bytes(id)])?;
        tracing::info!(category = %id, "Deleted category");
        Ok(())
    }

    /// Define a parameter (plan-checked); names are unique per owner
    pub fn create_parameter(
        &mut self,
        owner: RecordId,
        name: &str,
        description: Option<&str>,
        kind: ParameterKind,
    ) -> Result<ParameterDefinition, StoreError> {
        let name = require_name(name, "Parameter")?;
        let definition =
            ParameterDefinition::new(owner, name, description.map(str::to_string), kind)?;
        self.enforce_limit(owner, Resource::Parameters)?;

        let options = match &definition.kind {
            ParameterKind::Select { options } => Some(serde_json::to_string(options)?),
            _ => None,
        };

        self.conn
            .execute(
                "INSERT INTO parameters (id, user_id, name, description, parameter_type, options, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id_to_bytes(definition.id),
                    id_to_bytes(owner),
                    &definition.name,
                    &definition.description,
                    definition.kind.type_name(),
                    options,
                    now_millis() as i64,
                ],
            )
            .map_err(|e| map_unique(e, format!("parameter {}", definition.name)))?;

        tracing::info!(
            parameter = %definition.id,
            name = %definition.name,
            kind = definition.kind.type_name(),
            "Created parameter"
        );
        Ok(definition)
    }

    /// Change a parameter's name, description or kind
    ///
    /// Product values follow a rename. After a kind change, values that no
    /// longer validate are removed.
    pub fn update_parameter(
        &mut self,
        owner: RecordId,
        id: RecordId,
        update: ParameterUpdate,
    ) -> Result<ParameterDefinition, StoreError> {
        let current = self.owned_parameter(owner, id)?;
        let name = match &update.name {
            Some(name) => require_name(name, "Parameter")?,
            None => current.name.clone(),
        };
        let mut updated = ParameterDefinition::new(
            owner,
            name,
            update.description.or_else(|| current.description.clone()),
            update.kind.unwrap_or_else(|| current.kind.clone()),
        )?;
        updated.id = id;

        let options = match &updated.kind {
            ParameterKind::Select { options } => Some(serde_json::to_string(options)?),
            _ => None,
        };

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE parameters SET name = ?1, description = ?2, parameter_type = ?3, options = ?4
             WHERE id = ?5",
            params![
                &updated.name,
                &updated.description,
                updated.kind.type_name(),
                options,
                id_to_bytes(id),
            ],
        )
        .map_err(|e| map_unique(e, format!("parameter {}", updated.name)))?;
        let rewritten = rewrite_values(&tx, owner, |values| {
            let Some(value) = values.remove(&current.name) else {
                return false;
            };
            if updated.validate(&value).is_ok() {
                values.insert(updated.name.clone(), value);
            }
            true
        })?;
        tx.commit()?;

        tracing::info!(
            parameter = %id,
            name = %updated.name,
            kind = updated.kind.type_name(),
            products = rewritten,
            "Updated parameter"
        );
        Ok(updated)
    }

    /// Delete a parameter, detaching it and clearing its product values
    pub fn delete_parameter(&mut self, owner: RecordId, id: RecordId) -> Result<(), StoreError> {
        let parameter = self.owned_parameter(owner, id)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM parameters WHERE id = ?1", params![id_to_bytes(id)])?;
        let rewritten = rewrite_values(&tx, owner, |values| {
            values.remove(&parameter.name).is_some()
        })?;
        tx.commit()?;

        tracing::info!(parameter = %id, products = rewritten, "Deleted parameter");
        Ok(())
    }

    fn owned_parameter(
        &self,
        owner: RecordId,
        id: RecordId,
    ) -> Result<ParameterDefinition, StoreError> {
        let parameter = self
            .get_parameter(id)?
            .ok_or_else(|| StoreError::NotFound(format!("parameter {}", id)))?;
        if parameter.owner != owner {
            return Err(StoreError::Forbidden(format!(
                "parameter {} belongs to another user",
                id
            )));
        }
        Ok(parameter)
    }

    /// Get a parameter by ID
    pub fn get_parameter(&self, id: RecordId) -> Result<Option<ParameterDefinition>, StoreError> {
        let parameter = self
            .conn
            .query_row(
                &format!("SELECT {} FROM parameters WHERE id = ?1", PARAMETER_COLUMNS),
                params![id_to_bytes(id)],
                parameter_from_row,
            )
            .optional()?;
        Ok(parameter)
    }

    /// Parameters of `owner`, by name
    pub fn list_parameters(&self, owner: RecordId) -> Result<Vec<ParameterDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM parameters WHERE user_id = ?1 ORDER BY name COLLATE NOCASE",
            PARAMETER_COLUMNS
        ))?;
        let parameters = stmt
            .query_map(params![id_to_bytes(owner)], parameter_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parameters)
    }

    /// Attach a parameter to a category; both must belong to `owner`
    ///
    /// Attaching twice is a no-op.
    pub fn attach_parameter(
        &mut self,
        owner: RecordId,
        category_id: RecordId,
        parameter_id: RecordId,
    ) -> Result<(), StoreError> {
        self.owned_category(owner, category_id)?;
        self.owned_parameter(owner, parameter_id)?;

        self.conn.execute(
            "INSERT OR IGNORE INTO category_parameters (category_id, parameter_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                id_to_bytes(category_id),
                id_to_bytes(parameter_id),
                now_millis() as i64
            ],
        )?;

        tracing::debug!(category = %category_id, parameter = %parameter_id, "Attached parameter");
        Ok(())
    }

    /// Detach a parameter from a category
    ///
    /// Returns false if it was not attached. Product values are kept.
    pub fn detach_parameter(
        &mut self,
        owner: RecordId,
        category_id: RecordId,
        parameter_id: RecordId,
    ) -> Result<bool, StoreError> {
        self.owned_category(owner, category_id)?;
        let removed = self.conn.execute(
            "DELETE FROM category_parameters WHERE category_id = ?1 AND parameter_id = ?2",
            params![id_to_bytes(category_id), id_to_bytes(parameter_id)],
        )?;
        tracing::debug!(
            category = %category_id,
            parameter = %parameter_id,
            removed,
            "Detached parameter"
        );
        Ok(removed > 0)
    }

    /// Replace the set of parameters attached to a category
    pub fn set_category_parameters(
        &mut self,
        owner: RecordId,
        category_id: RecordId,
        parameter_ids: &[RecordId],
    ) -> Result<(), StoreError> {
        self.owned_category(owner, category_id)?;
        for &parameter_id in parameter_ids {
            self.owned_parameter(owner, parameter_id)?;
        }

        let now = now_millis() as i64;
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM category_parameters WHERE category_id = ?1",
            params![id_to_bytes(category_id)],
        )?;
        for &parameter_id in parameter_ids {
            tx.execute(
                "INSERT OR IGNORE INTO category_parameters (category_id, parameter_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![id_to_bytes(category_id), id_to_bytes(parameter_id), now],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            category = %category_id,
            parameters = parameter_ids.len(),
            "Replaced category parameters"
        );
        Ok(())
    }

    /// Parameters attached to a category, by name
    pub fn category_parameters(
        &self,
        category_id: RecordId,
    ) -> Result<Vec<ParameterDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.user_id, p.name, p.description, p.parameter_type, p.options
             FROM parameters p
             JOIN category_parameters cp ON cp.parameter_id = p.id
             WHERE cp.category_id = ?1
             ORDER BY p.name COLLATE NOCASE",
        )?;
        let parameters = stmt
            .query_map(params![id_to_bytes(category_id)], parameter_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parameters)
    }

    /// Add a product to a category owned by `owner` (plan-checked)
    ///
    /// Raw values are matched to attached parameters by name
    /// (case-insensitive) and coerced to the parameter's kind.
    pub fn add_product(&mut self, owner: RecordId, new: NewProduct) -> Result<Product, StoreError> {
        let name = require_name(&new.name, "Product")?;
        self.owned_category(owner, new.category_id)?;

        let parameters = self.category_parameters(new.category_id)?;
        let mut parameter_values = BTreeMap::new();
        apply_values(&parameters, &new.values, &mut parameter_values)?;

        self.enforce_limit(owner, Resource::Products)?;

        let product = Product {
            id: RecordId::new(),
            owner,
            category_id: new.category_id,
            name,
            description: new.description,
            image_url: new.image_url,
            parameter_values,
            created_at: now_millis(),
        };

        self.conn.execute(
            "INSERT INTO products (id, user_id, category_id, name, description, image_url, parameter_values, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id_to_bytes(product.id),
                id_to_bytes(owner),
                id_to_bytes(product.category_id),
                &product.name,
                &product.description,
                &product.image_url,
                serde_json::to_string(&product.parameter_values)?,
                product.created_at as i64,
            ],
        )?;

        tracing::info!(product = %product.id, name = %product.name, "Added product");
        Ok(product)
    }

    /// Get a product by ID
    pub fn get_product(&self, id: RecordId) -> Result<Option<Product>, StoreError> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id_to_bytes(id)],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// Products of a category in catalog order (oldest first)
    pub fn list_products(&self, category_id: RecordId) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM products WHERE category_id = ?1 ORDER BY created_at, rowid",
            PRODUCT_COLUMNS
        ))?;
        let products = stmt
            .query_map(params![id_to_bytes(category_id)], product_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Edit a product owned by `owner`
    ///
    /// New values are coerced like in [`add_product`](Self::add_product);
    /// `unset` names are removed whether or not still attached.
    pub fn update_product(
        &mut self,
        owner: RecordId,
        id: RecordId,
        update: ProductUpdate,
    ) -> Result<Product, StoreError> {
        let mut product = self
            .get_product(id)?
            .filter(|p| p.owner == owner)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;

        if let Some(name) = &update.name {
            product.name = require_name(name, "Product")?;
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            product.image_url = Some(image_url);
        }
        for name in &update.unset {
            let name = name.trim().to_lowercase();
            product
                .parameter_values
                .retain(|key, _| key.to_lowercase() != name);
        }
        if !update.values.is_empty() {
            let parameters = self.category_parameters(product.category_id)?;
            apply_values(&parameters, &update.values, &mut product.parameter_values)?;
        }

        self.conn.execute(
            "UPDATE products SET name = ?1, description = ?2, image_url = ?3, parameter_values = ?4
             WHERE id = ?5",
            params![
                &product.name,
                &product.description,
                &product.image_url,
                serde_json::to_string(&product.parameter_values)?,
                id_to_bytes(id),
            ],
        )?;

        tracing::info!(product = %id, name = %product.name, "Updated product");
        Ok(product)
    }

    /// Remove a product owned by `owner`
    ///
    /// Tier lists that still mention it report a stale reference on load.
    pub fn delete_product(&mut self, owner: RecordId, id: RecordId) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "DELETE FROM products WHERE id = ?1 AND user_id = ?2",
            params![id_to_bytes(id), id_to_bytes(owner)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("product {}", id)));
        }
        tracing::info!(product = %id, "Deleted product");
        Ok(())
    }
}

/// Apply `edit` to the parameter values of every product of `owner`,
/// writing back those it reports as changed
fn rewrite_values<F>(conn: &Connection, owner: RecordId, mut edit: F) -> Result<usize, StoreError>
where
    F: FnMut(&mut BTreeMap<String, ParameterValue>) -> bool,
{
    let mut stmt = conn.prepare("SELECT id, parameter_values FROM products WHERE user_id = ?1")?;
    let rows = stmt
        .query_map(params![id_to_bytes(owner)], |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rewritten = 0;
    for (id, json) in rows {
        let mut values: BTreeMap<String, ParameterValue> = serde_json::from_str(&json)?;
        if edit(&mut values) {
            conn.execute(
                "UPDATE products SET parameter_values = ?1 WHERE id = ?2",
                params![serde_json::to_string(&values)?, id],
            )?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

impl ProductCatalog for SqliteStore {
    type Error = StoreError;

    fn catalog(&self, category_id: RecordId) -> Result<Vec<ProductRef>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM products WHERE category_id = ?1 ORDER BY created_at, rowid",
        )?;
        let refs = stmt
            .query_map(params![id_to_bytes(category_id)], |row| row_id(row, 0))?
            .map(|id| id.map(|id| ProductRef::new(id.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(refs)
    }
}
