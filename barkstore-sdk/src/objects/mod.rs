pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod currency;
pub mod payment;

pub use cart::{CartLine, CartView};
pub use catalog::Product;
pub use checkout::{
    ContactForm, CryptoQuote, CryptoQuoteEntry, NewsletterSignup, OrderLine, OrderSummary,
    PayRequest, PayResponse, QuoteResponse,
};
pub use currency::{Currency, UnsupportedCurrency};
pub use payment::{CheckoutRedirect, PaymentMethod, TransferResult};
