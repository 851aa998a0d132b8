//! Shopping cart value object.
//!
//! The storefront keeps the cart in browser storage; this module models it as
//! a plain serializable value with explicit [`Cart::to_json`] /
//! [`Cart::from_json`] at session boundaries. Items snapshot the product
//! fields the cart needs (price, discount, a stock ceiling) so totals and the
//! WhatsApp hand-off message can be computed without another catalog fetch.

use crate::errors::ServiceError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// One cart line: a product snapshot plus the chosen quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub sale_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_active: bool,
    pub image_url: Option<String>,
    /// Stock at snapshot time; quantity changes are clamped against it
    pub stock: i32,
    pub quantity: i32,
}

impl CartItem {
    fn has_discount(&self) -> bool {
        self.discount_active && self.discount_percent > Decimal::ZERO
    }

    /// Unit price with an active discount applied
    pub fn effective_unit_price(&self) -> Decimal {
        if self.has_discount() {
            self.sale_price * (Decimal::ONE - self.discount_percent / Decimal::from(100))
        } else {
            self.sale_price
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// The cart itself: an ordered list of items, one per product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item, merging quantities when the product is already present.
    /// Fails with `InsufficientStock` when the resulting quantity would
    /// exceed the item's stock ceiling, leaving the cart unchanged.
    pub fn add(&mut self, item: CartItem) -> Result<(), ServiceError> {
        if item.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            let quantity = existing.quantity + item.quantity;
            if quantity > existing.stock {
                return Err(ServiceError::InsufficientStock(format!(
                    "only {} units of {} available",
                    existing.stock, existing.name
                )));
            }
            existing.quantity = quantity;
            return Ok(());
        }

        if item.quantity > item.stock {
            return Err(ServiceError::InsufficientStock(format!(
                "only {} units of {} available",
                item.stock, item.name
            )));
        }
        self.items.push(item);
        Ok(())
    }

    /// Set the quantity for a product; zero or less removes the line.
    /// Unknown products are ignored.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) -> Result<(), ServiceError> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            if quantity > item.stock {
                return Err(ServiceError::InsufficientStock(format!(
                    "only {} units of {} available",
                    item.stock, item.name
                )));
            }
            item.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Discount-aware grand total
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(|i| i.subtotal()).sum()
    }

    /// Serialize for storage at a session boundary
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("cart serialization cannot fail")
    }

    /// Rehydrate a cart saved by [`Cart::to_json`]
    pub fn from_json(raw: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(raw)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid cart payload: {}", e)))
    }

    /// Order summary handed to the shop over WhatsApp
    pub fn order_message(&self) -> String {
        let mut message = String::from("*Hi! I'd like to order the following products:*\n\n");

        for (index, item) in self.items.iter().enumerate() {
            let unit_price = item.effective_unit_price();

            message.push_str(&format!("{}. *{}*\n", index + 1, item.name));
            if item.has_discount() {
                message.push_str(&format!("   - OFFER: {}% OFF\n", item.discount_percent));
                message.push_str(&format!(
                    "   - Price: {} (before: {})\n",
                    format_price(unit_price),
                    format_price(item.sale_price)
                ));
            } else {
                message.push_str(&format!("   - Price: {}\n", format_price(unit_price)));
            }
            message.push_str(&format!("   - Quantity: {}\n", item.quantity));
            message.push_str(&format!(
                "   - Subtotal: {}\n\n",
                format_price(item.subtotal())
            ));
        }

        message.push_str("---------------------------\n");
        message.push_str(&format!("*Total items:* {}\n", self.total_items()));
        message.push_str(&format!(
            "*TOTAL TO PAY:* {}\n\n",
            format_price(self.total_price())
        ));
        message.push_str("Are these products available?");

        message
    }

    /// Deep link opening a WhatsApp chat with the prepared order summary.
    /// `phone` is the shop's number in international digits without the "+".
    pub fn whatsapp_order_url(&self, phone: &str) -> Result<Url, ServiceError> {
        Url::parse_with_params(
            &format!("https://wa.me/{}", phone),
            &[("text", self.order_message())],
        )
        .map_err(|e| ServiceError::InvalidInput(format!("invalid WhatsApp phone number: {}", e)))
    }
}

fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, price: Decimal, percent: Decimal, active: bool, stock: i32) -> CartItem {
        CartItem {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            sale_price: price,
            discount_percent: percent,
            discount_active: active,
            image_url: None,
            stock,
            quantity: 1,
        }
    }

    #[test]
    fn add_merges_quantities_for_the_same_product() {
        let mut cart = Cart::new();
        let line = item("Amber Noir", dec!(20), Decimal::ZERO, false, 5);
        cart.add(line.clone()).unwrap();
        cart.add(line).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn add_rejects_quantities_beyond_stock() {
        let mut cart = Cart::new();
        let mut line = item("Amber Noir", dec!(20), Decimal::ZERO, false, 2);
        line.quantity = 2;
        cart.add(line.clone()).unwrap();

        line.quantity = 1;
        let err = cart.add(line).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock(_)));
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let mut cart = Cart::new();
        let line = item("Amber Noir", dec!(20), Decimal::ZERO, false, 5);
        let id = line.product_id;
        cart.add(line).unwrap();

        cart.set_quantity(id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn total_price_applies_active_discounts() {
        let mut cart = Cart::new();
        let mut discounted = item("Amber Noir", dec!(20), dec!(25), true, 5);
        discounted.quantity = 2;
        cart.add(discounted).unwrap();
        cart.add(item("Citrus Bloom", dec!(10), dec!(50), false, 5))
            .unwrap();

        // 2 * 15 (discounted) + 1 * 10 (discount inactive)
        assert_eq!(cart.total_price(), dec!(40.00));
    }

    #[test]
    fn json_round_trip_preserves_the_cart() {
        let mut cart = Cart::new();
        cart.add(item("Amber Noir", dec!(20), dec!(25), true, 5))
            .unwrap();

        let restored = Cart::from_json(&cart.to_json()).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(Cart::from_json("not a cart").is_err());
    }

    #[test]
    fn order_message_lists_items_and_totals() {
        let mut cart = Cart::new();
        let mut line = item("Amber Noir", dec!(20), dec!(25), true, 5);
        line.quantity = 2;
        cart.add(line).unwrap();

        let message = cart.order_message();
        assert!(message.contains("1. *Amber Noir*"));
        assert!(message.contains("OFFER: 25% OFF"));
        assert!(message.contains("Price: $15.00 (before: $20.00)"));
        assert!(message.contains("*Total items:* 2"));
        assert!(message.contains("*TOTAL TO PAY:* $30.00"));
    }

    #[test]
    fn whatsapp_url_targets_the_shop_number() {
        let mut cart = Cart::new();
        cart.add(item("Amber Noir", dec!(20), Decimal::ZERO, false, 5))
            .unwrap();

        let url = cart.whatsapp_order_url("5491100000000").unwrap();
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/5491100000000");
        assert!(url.query().unwrap().starts_with("text="));
    }
}
