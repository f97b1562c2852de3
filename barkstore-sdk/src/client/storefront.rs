//! Storefront API client (browser/kiosk frontend → barkstore server).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{
    CartView, ContactForm, NewsletterSignup, PayRequest, PayResponse, PaymentMethod, Product,
    QuoteResponse,
};

/// Typed HTTP client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
}

impl StorefrontClient {
    /// Create a new client against `base_url` (the server root).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /products` – full catalog.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.base_url.join("/products")?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `GET /products/{id}` – one catalog entry.
    pub async fn product(&self, id: u32) -> Result<Product, ClientError> {
        let url = self.base_url.join(&format!("/products/{id}"))?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `GET /cart` – lines plus derived totals.
    pub async fn cart(&self) -> Result<CartView, ClientError> {
        let url = self.base_url.join("/cart")?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `POST /cart/{id}/increase` – add one of a product.
    pub async fn increase(&self, id: u32) -> Result<CartView, ClientError> {
        let url = self.base_url.join(&format!("/cart/{id}/increase"))?;
        parse_response(self.http.post(url).send().await?).await
    }

    /// `POST /cart/{id}/decrease` – remove one of a product.
    pub async fn decrease(&self, id: u32) -> Result<CartView, ClientError> {
        let url = self.base_url.join(&format!("/cart/{id}/decrease"))?;
        parse_response(self.http.post(url).send().await?).await
    }

    /// `DELETE /cart/{id}` – drop a line entirely.
    pub async fn remove(&self, id: u32) -> Result<CartView, ClientError> {
        let url = self.base_url.join(&format!("/cart/{id}"))?;
        parse_response(self.http.delete(url).send().await?).await
    }

    /// `DELETE /cart` – empty the cart.
    pub async fn clear(&self) -> Result<CartView, ClientError> {
        let url = self.base_url.join("/cart")?;
        parse_response(self.http.delete(url).send().await?).await
    }

    /// `GET /checkout/quote` – order totals plus best-effort crypto quotes.
    pub async fn quote(&self) -> Result<QuoteResponse, ClientError> {
        let url = self.base_url.join("/checkout/quote")?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `POST /checkout/pay` – dispatch one payment method.
    pub async fn pay(&self, method: PaymentMethod) -> Result<PayResponse, ClientError> {
        let url = self.base_url.join("/checkout/pay")?;
        let body = PayRequest { method };
        parse_response(self.http.post(url).json(&body).send().await?).await
    }

    /// `POST /checkout/acknowledge` – acknowledge the confirmation view,
    /// clearing the cart.
    pub async fn acknowledge(&self) -> Result<(), ClientError> {
        let url = self.base_url.join("/checkout/acknowledge")?;
        let resp = self.http.post(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// `POST /contact` – relay a contact form to the CRM.
    pub async fn contact(&self, form: &ContactForm) -> Result<(), ClientError> {
        let url = self.base_url.join("/contact")?;
        let resp = self.http.post(url).json(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// `POST /newsletter` – relay a newsletter signup to the CRM.
    pub async fn subscribe(&self, signup: &NewsletterSignup) -> Result<(), ClientError> {
        let url = self.base_url.join("/newsletter")?;
        let resp = self.http.post(url).json(signup).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
