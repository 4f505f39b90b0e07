//! Diesel table definitions for the marketplace schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration, then restore the doc
//! comments by hand.

diesel::table! {
    /// Identity record for every account.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Normalised address; unique index `users_email_key`.
        email -> Varchar,
        /// bcrypt digest. Never serialised.
        password_digest -> Varchar,
        /// One of `USER`, `SELLER`, `ADMIN`.
        role -> Varchar,
        is_email_verified -> Bool,
        is_document_verified -> Bool,
        address -> Varchar,
        country_code -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        profile_pic_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Seller extension, one-to-one with `users`.
    sellers (user_id) {
        user_id -> Uuid,
        business_desc -> Text,
        business_type -> Text,
        verification_doc_url -> Nullable<Text>,
    }
}

diesel::table! {
    /// Admin extension, one-to-one with `users`.
    admins (user_id) {
        user_id -> Uuid,
        permissions -> Array<Text>,
    }
}

diesel::table! {
    /// Product listings.
    ///
    /// `seller_user_id` is cleared (and `owner_deleted` set) when the owning
    /// account is deleted; the listing itself is retained.
    products (id) {
        id -> Int8,
        seller_user_id -> Nullable<Uuid>,
        owner_deleted -> Bool,
        name -> Varchar,
        price -> Float8,
        currency -> Varchar,
        quantity -> Int4,
        unit -> Varchar,
        category -> Varchar,
        country -> Nullable<Varchar>,
        color -> Nullable<Varchar>,
        source_material -> Nullable<Varchar>,
        batch_size -> Nullable<Varchar>,
        minimum_order_quantity -> Nullable<Int4>,
        application -> Nullable<Varchar>,
        description -> Nullable<Text>,
        additional_notes -> Nullable<Text>,
        /// Moderation code: 0 pending, 1 approved, -1 rejected, -2 deleted.
        status -> Int2,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered image URLs attached to a product.
    product_images (id) {
        id -> Int8,
        product_id -> Int8,
        url -> Text,
        position -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only notification ledger.
    notifications (id) {
        id -> Int8,
        /// Addressee. Deliberately not a foreign key.
        user_id -> Uuid,
        product_id -> Nullable<Int8>,
        notification_type -> Varchar,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Buyer enquiries against products.
    enquiries (id) {
        id -> Int8,
        user_id -> Uuid,
        product_id -> Int8,
        message -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact requests from the public chat widget.
    chat_leads (id) {
        id -> Int8,
        company_name -> Varchar,
        user_name -> Varchar,
        phone_number -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(sellers -> users (user_id));
diesel::joinable!(admins -> users (user_id));
diesel::joinable!(product_images -> products (product_id));
diesel::joinable!(enquiries -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    admins,
    chat_leads,
    enquiries,
    notifications,
    product_images,
    products,
    sellers,
    users,
);
