//! Diesel table definitions. Must match `migrations/` exactly.

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 150]
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    groups (id) {
        id -> Int8,
        #[max_length = 200]
        title -> Varchar,
        #[max_length = 50]
        slug -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    posts (id) {
        id -> Int8,
        text -> Text,
        pub_date -> Timestamptz,
        author_id -> Uuid,
        group_id -> Nullable<Int8>,
        /// Path relative to the media root, e.g. `posts/cat.gif`.
        #[max_length = 255]
        image -> Nullable<Varchar>,
    }
}

diesel::table! {
    comments (id) {
        id -> Int8,
        post_id -> Int8,
        author_id -> Uuid,
        #[max_length = 255]
        text -> Varchar,
        created -> Timestamptz,
    }
}

diesel::table! {
    follows (id) {
        id -> Int8,
        user_id -> Uuid,
        author_id -> Uuid,
    }
}

diesel::joinable!(posts -> groups (group_id));
diesel::joinable!(comments -> posts (post_id));

diesel::allow_tables_to_appear_in_same_query!(users, groups, posts, comments, follows);
