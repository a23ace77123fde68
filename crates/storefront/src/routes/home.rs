//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::product::Category;
use crate::routes::context::PageContext;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<ProductCardView>,
    pub new_products: Vec<ProductCardView>,
    pub categories: Vec<Category>,
    pub best_sellers: Vec<ProductCardView>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let repo = ProductRepository::new(state.pool());

    let featured = repo.featured(8).await?;
    let new_products = repo.newest(8).await?;
    let categories = repo.list_categories(Some(6)).await?;
    let best_sellers = repo.best_sellers(4).await?;

    let page = PageContext::build(&state, &session, user).await;

    Ok(HomeTemplate {
        page,
        featured: featured.iter().map(ProductCardView::from).collect(),
        new_products: new_products.iter().map(ProductCardView::from).collect(),
        categories,
        best_sellers: best_sellers.iter().map(ProductCardView::from).collect(),
    })
}
