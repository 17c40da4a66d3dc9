//! Pricing engine: resolves a cart against the catalog.

use rust_decimal::Decimal;

use crate::domain::{Cart, PricedCart, PricedLine};
use crate::error::ClubError;
use crate::storage::Catalog;

/// Prices a cart against current catalog prices.
///
/// Unit prices are captured here as a point-in-time snapshot; later
/// catalog edits never change an order priced from this result. Unknown
/// and unavailable drinks are rejected outright rather than priced at
/// zero.
///
/// # Errors
///
/// Returns [`ClubError::EmptyCart`] for a cart with no lines,
/// [`ClubError::InvalidAmount`] for a non-positive quantity,
/// [`ClubError::DrinkUnavailable`] for an unknown or unavailable drink,
/// and [`ClubError::StoreUnavailable`] on catalog failure.
pub async fn price_cart<C: Catalog>(catalog: &C, cart: &Cart) -> Result<PricedCart, ClubError> {
    if cart.lines.is_empty() {
        return Err(ClubError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut total = Decimal::ZERO;

    for line in &cart.lines {
        if line.quantity == 0 {
            return Err(ClubError::InvalidAmount(format!(
                "quantity for drink {} must be positive",
                line.drink_id
            )));
        }

        let price = catalog
            .price_of(line.drink_id)
            .await?
            .filter(|p| p.available)
            .ok_or(ClubError::DrinkUnavailable(line.drink_id.get()))?;

        total += price.price * Decimal::from(line.quantity);
        lines.push(PricedLine {
            drink_id: line.drink_id,
            drink_name: price.name,
            quantity: line.quantity,
            unit_price: price.price,
        });
    }

    Ok(PricedCart { total, lines })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CartLine;
    use crate::storage::MemoryStorage;

    async fn catalog_with_drinks() -> (MemoryStorage, crate::domain::DrinkId, crate::domain::DrinkId)
    {
        let store = MemoryStorage::new();
        let Ok(cocktail) = store
            .create_drink("House Cocktail", Decimal::new(45_000, 2), Some("Cocktails"))
            .await
        else {
            panic!("drink creation failed");
        };
        let Ok(beer) = store
            .create_drink("Draft Beer", Decimal::new(20_000, 2), Some("Beer"))
            .await
        else {
            panic!("drink creation failed");
        };
        (store, cocktail.id, beer.id)
    }

    #[tokio::test]
    async fn totals_sum_over_quantities() {
        let (store, cocktail, beer) = catalog_with_drinks().await;
        let cart = Cart {
            lines: vec![
                CartLine {
                    drink_id: cocktail,
                    quantity: 1,
                },
                CartLine {
                    drink_id: beer,
                    quantity: 2,
                },
            ],
        };

        let Ok(priced) = price_cart(&store, &cart).await else {
            panic!("pricing failed");
        };
        // 450.00 + 2 × 200.00
        assert_eq!(priced.total, Decimal::new(85_000, 2));
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.items_summary(), "House Cocktail x1, Draft Beer x2");
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let (store, _, _) = catalog_with_drinks().await;
        let result = price_cart(&store, &Cart::default()).await;
        assert!(matches!(result, Err(ClubError::EmptyCart)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (store, cocktail, _) = catalog_with_drinks().await;
        let cart = Cart {
            lines: vec![CartLine {
                drink_id: cocktail,
                quantity: 0,
            }],
        };
        let result = price_cart(&store, &cart).await;
        assert!(matches!(result, Err(ClubError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn unknown_drink_is_rejected_not_free() {
        let (store, _, _) = catalog_with_drinks().await;
        let cart = Cart {
            lines: vec![CartLine {
                drink_id: crate::domain::DrinkId::new(999),
                quantity: 1,
            }],
        };
        let result = price_cart(&store, &cart).await;
        assert!(matches!(result, Err(ClubError::DrinkUnavailable(999))));
    }

    #[tokio::test]
    async fn disabled_drink_is_rejected() {
        let (store, cocktail, _) = catalog_with_drinks().await;
        let _ = store.set_drink_availability(cocktail, false).await;

        let cart = Cart {
            lines: vec![CartLine {
                drink_id: cocktail,
                quantity: 1,
            }],
        };
        let result = price_cart(&store, &cart).await;
        assert!(matches!(result, Err(ClubError::DrinkUnavailable(_))));
    }
}
