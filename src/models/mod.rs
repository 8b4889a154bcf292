mod product;

pub use product::{
    CategoryStats, DeleteProductResponse, NewProduct, Product, ProductInput, ProductListResponse,
    ProductPayload, ProductStatsResponse,
};
