// @generated manually to mirror `migrations/`.

diesel::table! {
    articles (id) {
        id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        link -> Nullable<Text>,
        pub_date -> Timestamptz,
        source -> Nullable<Text>,
        image_url -> Nullable<Text>,
        sentiment -> Nullable<Text>,
        ai_summary -> Nullable<Text>,
        needs_sentiment -> Bool,
        needs_summary -> Bool,
        content_timeout -> Int4,
        summary_error -> Nullable<Text>,
        extracted_content -> Nullable<Text>,
        queued_at -> Int8,
        processed_at -> Nullable<Int8>,
        created_at -> Int8,
        updated_at -> Int8,
    }
}

diesel::table! {
    processing_checkpoint (id) {
        id -> Int4,
        current_article_id -> Nullable<Text>,
        articles_processed_count -> Int8,
    }
}
