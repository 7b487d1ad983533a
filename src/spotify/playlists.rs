use crate::{
    spotify::{ApiError, CatalogApi, SpotifyClient},
    types::{Page, Playlist, PlaylistItem},
};

/// Page size for `GET /users/{user_id}/playlists` (API maximum).
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;
/// Page size for `GET /playlists/{playlist_id}/tracks` (API maximum).
pub const ITEM_PAGE_LIMIT: u32 = 100;

impl CatalogApi for SpotifyClient {
    fn authenticate(&mut self) -> Result<(), ApiError> {
        self.access_token().map(|_| ())
    }

    /// Retrieves a page of the public playlists of `user_id`.
    ///
    /// The listing contains followed playlists as well as owned ones; owner
    /// filtering is left to the caller. Null entries are dropped.
    fn user_playlists(
        &mut self,
        user_id: &str,
        next: Option<&str>,
    ) -> Result<Page<Playlist>, ApiError> {
        let url = match next {
            Some(next) => next.to_string(),
            None => self
                .endpoint(
                    &["users", user_id, "playlists"],
                    &[("limit", PLAYLIST_PAGE_LIMIT.to_string())],
                )?
                .to_string(),
        };

        let page = self.get_json::<Page<Option<Playlist>>>(&url)?;
        Ok(Page {
            items: page.items.into_iter().flatten().collect(),
            next: page.next,
            total: page.total,
        })
    }

    /// Retrieves a page of items of a playlist, asking only for tracks.
    /// Episodes can still show up and are filtered by the caller.
    fn playlist_items(
        &mut self,
        playlist_id: &str,
        next: Option<&str>,
    ) -> Result<Page<PlaylistItem>, ApiError> {
        let url = match next {
            Some(next) => next.to_string(),
            None => self
                .endpoint(
                    &["playlists", playlist_id, "tracks"],
                    &[
                        ("limit", ITEM_PAGE_LIMIT.to_string()),
                        ("additional_types", "track".to_string()),
                    ],
                )?
                .to_string(),
        };

        let page = self.get_json::<Page<Option<PlaylistItem>>>(&url)?;
        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            next: page.next,
            total: page.total,
        })
    }
}
