//! Default payloads written the first time a local data file is opened.

use chrono::{DateTime, Utc};
use common::{
    Bilingual, Category, CategoryId, Money, NewUser, Product, ProductId, Role, StoreId, UserId,
};
use uuid::Uuid;

use crate::Result;
use crate::json_file::{StoreDocument, UsersDocument};

/// Settings key holding the delivery fee.
pub const DELIVERY_FEE_KEY: &str = "delivery_fee";

/// The single administrator account seeded into a fresh users file.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
    /// bcrypt cost used to hash `password`; the same cost registration uses.
    pub bcrypt_cost: u32,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            email: "admin@irth-biladi.com".to_string(),
            name: "Administrator".to_string(),
            password: "admin123".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BootstrapAdmin {
    /// Hashes the password and builds the users document.
    pub(crate) fn users_document(&self, now: DateTime<Utc>) -> Result<UsersDocument> {
        let password_hash = bcrypt::hash(&self.password, self.bcrypt_cost)?;
        let admin = NewUser {
            email: self.email.trim().to_lowercase(),
            name: self.name.clone(),
            role: Role::Admin,
            password_hash,
        }
        .into_record(UserId::new(), now);

        Ok(UsersDocument { users: vec![admin] })
    }
}

const DAIRY: u128 = 0x6f1c_2b7e_0000_4000_8000_0000_0000_0001;
const DATES: u128 = 0x6f1c_2b7e_0000_4000_8000_0000_0000_0002;
const SPICES: u128 = 0x6f1c_2b7e_0000_4000_8000_0000_0000_0003;
const OILS: u128 = 0x6f1c_2b7e_0000_4000_8000_0000_0000_0004;

fn category(id: u128, en: &str, ar: &str, slug: &str, now: DateTime<Utc>) -> Category {
    Category {
        id: CategoryId::from_uuid(Uuid::from_u128(id)),
        name: Bilingual::new(en, ar),
        description: None,
        slug: slug.to_string(),
        created_at: now,
        updated_at: now,
    }
}

struct SeedProduct {
    en: &'static str,
    ar: &'static str,
    description_en: &'static str,
    description_ar: &'static str,
    minor: i64,
    category: u128,
    weight: &'static str,
    origin: &'static str,
    store: StoreId,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        en: "Nabulsi Cheese",
        ar: "جبنة نابلسية",
        description_en: "Traditional brined white cheese",
        description_ar: "جبنة بيضاء تقليدية مملحة",
        minor: 4500,
        category: DAIRY,
        weight: "1kg",
        origin: "Nablus",
        store: StoreId::IrthBiladi,
    },
    SeedProduct {
        en: "Medjool Dates",
        ar: "تمر مجدول",
        description_en: "Large soft Medjool dates",
        description_ar: "تمر مجدول كبير وطري",
        minor: 3500,
        category: DATES,
        weight: "1kg",
        origin: "Jericho",
        store: StoreId::IrthBiladi,
    },
    SeedProduct {
        en: "Za'atar Blend",
        ar: "زعتر بلدي",
        description_en: "Wild thyme with sumac and sesame",
        description_ar: "زعتر بري مع السماق والسمسم",
        minor: 1800,
        category: SPICES,
        weight: "500g",
        origin: "Galilee",
        store: StoreId::Cilka,
    },
    SeedProduct {
        en: "Extra Virgin Olive Oil",
        ar: "زيت زيتون بكر ممتاز",
        description_en: "First cold press from this season's harvest",
        description_ar: "عصرة أولى على البارد من موسم هذا العام",
        minor: 6000,
        category: OILS,
        weight: "2L",
        origin: "Jenin",
        store: StoreId::Cilka,
    },
];

/// Builds the default catalog document.
pub(crate) fn store_document(now: DateTime<Utc>) -> StoreDocument {
    let categories = vec![
        category(DAIRY, "Dairy Products", "منتجات الألبان", "dairy-products", now),
        category(DATES, "Dates", "تمور", "dates", now),
        category(SPICES, "Spices & Herbs", "بهارات وأعشاب", "spices-herbs", now),
        category(OILS, "Olive Oil", "زيت الزيتون", "olive-oil", now),
    ];

    let products = PRODUCTS
        .iter()
        .map(|seed| Product {
            id: ProductId::new(),
            name: Bilingual::new(seed.en, seed.ar),
            description: Bilingual::new(seed.description_en, seed.description_ar),
            price: Money::from_minor(seed.minor),
            image: None,
            category: CategoryId::from_uuid(Uuid::from_u128(seed.category)),
            weight: Some(seed.weight.to_string()),
            origin: Some(seed.origin.to_string()),
            store: seed.store,
            created_at: now,
            updated_at: now,
        })
        .collect();

    let mut settings = serde_json::Map::new();
    settings.insert(DELIVERY_FEE_KEY.to_string(), serde_json::json!(0));

    StoreDocument {
        products,
        categories,
        orders: Vec::new(),
        settings,
        messages: Vec::new(),
    }
}
