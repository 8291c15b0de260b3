//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).

pub mod clock {
    //! Controllable clock for expiry and timestamp tests.

    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The crate avoids direct `std::fs` calls; these helpers inspect the media
    //! directory through `cap_std::fs::Dir`.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a whole file below `root`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blog::test_support::cap_fs::{read_file, write_file};
    ///
    /// let root = tempfile::tempdir()?;
    /// write_file(root.path(), "posts/a.gif", b"GIF89a")?;
    /// assert_eq!(read_file(root.path(), "posts/a.gif")?, b"GIF89a");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file(root: &Path, relative: &str) -> io::Result<Vec<u8>> {
        Dir::open_ambient_dir(root, ambient_authority())?.read(relative)
    }

    /// Write a file below `root`, creating parent directories.
    pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> io::Result<()> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        match Path::new(relative).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => dir.create_dir_all(parent)?,
            _ => {}
        }
        dir.write(relative, contents)
    }

    /// Names of the files directly inside `root/relative`, sorted.
    pub fn list_files(root: &Path, relative: &str) -> io::Result<Vec<String>> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())?.open_dir(relative)?;
        let mut names = dir
            .entries()?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}

pub mod app {
    //! A fully wired [`HttpState`] over in-memory adapters.

    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::clock::MutableClock;
    use crate::domain::{Group, User};
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::outbound::cache::InMemoryPageCache;
    use crate::outbound::media::CapStdImageStorage;
    use crate::outbound::memory::InMemoryStore;

    /// Password given to every fixture user.
    pub const FIXTURE_PASSWORD: &str = "secret";

    /// Two users (`leo`, `mia`), one group (`cats`) and a clock frozen at
    /// 2024-01-01T12:00:00Z.
    pub struct BlogFixture {
        pub store: Arc<InMemoryStore>,
        pub clock: Arc<MutableClock>,
        pub media: TempDir,
        pub state: HttpState,
        pub leo: User,
        pub mia: User,
        pub cats: Group,
    }

    impl BlogFixture {
        /// Build the fixture.
        ///
        /// # Panics
        /// Panics when the scratch media directory cannot be created.
        pub fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let start = Utc
                .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
                .single()
                .unwrap_or_default();
            let clock = Arc::new(MutableClock::new(start));
            let media = tempfile::tempdir().expect("media dir");
            let images = CapStdImageStorage::open(media.path()).expect("media storage");
            let leo = store
                .register_user("leo", FIXTURE_PASSWORD)
                .expect("fixture user leo");
            let mia = store
                .register_user("mia", FIXTURE_PASSWORD)
                .expect("fixture user mia");
            let cats = store
                .insert_group("Cats", "cats", "All about cats")
                .expect("fixture group");
            let state = HttpState::from(HttpStatePorts {
                users: store.clone(),
                groups: store.clone(),
                posts: store.clone(),
                comments: store.clone(),
                follows: store.clone(),
                login: store.clone(),
                images: Arc::new(images),
                page_cache: Arc::new(InMemoryPageCache::new(clock.clone())),
                clock: clock.clone(),
            });
            Self {
                store,
                clock,
                media,
                state,
                leo,
                mia,
                cats,
            }
        }
    }

    impl Default for BlogFixture {
        fn default() -> Self {
            Self::new()
        }
    }
}
