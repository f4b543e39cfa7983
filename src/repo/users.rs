// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, OptionalExtension, params};

use crate::models::UserProfile;

pub fn insert(conn: &Connection, id: i64, name: &str, email: &str) -> rusqlite::Result<UserProfile> {
    conn.execute(
        "INSERT INTO users(id, name, email) VALUES (?1, ?2, ?3)",
        params![id, name, email],
    )?;
    Ok(UserProfile {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<UserProfile>> {
    conn.query_row(
        "SELECT id, name, email FROM users WHERE id=?1",
        params![id],
        |r| {
            Ok(UserProfile {
                id: r.get(0)?,
                name: r.get(1)?,
                email: r.get(2)?,
            })
        },
    )
    .optional()
}
