//! WhatsApp order handoff.
//!
//! After an order is stored, the customer is sent to `wa.me` with a
//! pre-filled summary in their language.

use common::{Language, Order, OrderItem};

const WA_ME: &str = "https://wa.me";

struct Labels {
    heading: &'static str,
    order: &'static str,
    subtotal: &'static str,
    delivery: &'static str,
    total: &'static str,
    address: &'static str,
    phone: &'static str,
}

const EN: Labels = Labels {
    heading: "New order from",
    order: "Order",
    subtotal: "Subtotal",
    delivery: "Delivery",
    total: "Total",
    address: "Address",
    phone: "Phone",
};

const AR: Labels = Labels {
    heading: "طلب جديد من",
    order: "رقم الطلب",
    subtotal: "المجموع الفرعي",
    delivery: "التوصيل",
    total: "المجموع",
    address: "العنوان",
    phone: "الهاتف",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Ar => &AR,
    }
}

fn item_name(item: &OrderItem, language: Language) -> String {
    match &item.product {
        Some(product) => product.name.get(language).to_string(),
        None => item.product_id.to_string(),
    }
}

/// Formats a placed order as a chat message.
pub fn order_message(order: &Order, language: Language) -> String {
    let l = labels(language);
    let mut lines = vec![
        format!("{} {}", l.heading, order.customer_name),
        format!("{}: {}", l.order, order.id),
        String::new(),
    ];

    for item in &order.items {
        lines.push(format!(
            "- {} x {} = {}",
            item.quantity,
            item_name(item, language),
            item.line_total()
        ));
    }

    lines.push(String::new());
    lines.push(format!("{}: {}", l.subtotal, order.items_total()));
    lines.push(format!("{}: {}", l.delivery, order.delivery_fee));
    lines.push(format!("{}: {}", l.total, order.total));

    let address = &order.shipping_address;
    lines.push(String::new());
    lines.push(format!(
        "{}: {}, {}, {}",
        l.address, address.street, address.city, address.country
    ));
    if let Some(phone) = &address.phone {
        lines.push(format!("{}: {}", l.phone, phone));
    }

    lines.join("\n")
}

/// `https://wa.me/<digits>?text=<message>`. Everything but digits is dropped
/// from `phone`.
pub fn handoff_url(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{WA_ME}/{digits}?text={}", urlencoding::encode(message))
}
