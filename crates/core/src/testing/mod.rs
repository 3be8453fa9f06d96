//! Testing utilities: a scriptable fetcher and indexer response fixtures.

mod mock_fetcher;

pub use mock_fetcher::{MockFetcher, RecordedRequest};

/// Indexer documents used across tests.
pub mod fixtures {
    use crate::provider::ProviderRecord;

    /// Newznab caps with tv-search on and a TV category tree.
    pub const NEWZNAB_CAPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<caps>
  <server version="1.0" title="Example" />
  <limits max="100" default="100"/>
  <searching>
    <search available="yes" supportedParams="q"/>
    <tv-search available="yes" supportedParams="q,rid,tvdbid,season,ep"/>
    <movie-search available="no"/>
  </searching>
  <categories>
    <category id="2000" name="Movies">
      <subcat id="2040" name="HD"/>
    </category>
    <category id="5000" name="TV">
      <subcat id="5030" name="SD"/>
      <subcat id="5040" name="HD"/>
    </category>
  </categories>
</caps>"#;

    /// Torznab caps without tvdbid support.
    pub const TORZNAB_CAPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<caps>
  <server title="Jackett" />
  <searching>
    <search available="yes" supportedParams="q" />
    <tv-search available="yes" supportedParams="q,season,ep" />
  </searching>
  <categories>
    <category id="5000" name="TV">
      <subcat id="5070" name="TV/Anime" />
    </category>
  </categories>
  <tags>
    <torznab:tag name="internal"/>
  </tags>
</caps>"#;

    /// Three usable items and one without a link.
    pub const NEWZNAB_RESULTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:newznab="http://www.newznab.com/DTD/2010/feeds/attributes/">
  <channel>
    <title>Example</title>
    <newznab:response offset="0" total="4"/>
    <item>
      <title>Show S02E05 720p HDTV x264</title>
      <link>https://nzb.cat/getnzb/aaa.nzb</link>
      <pubDate>Tue, 05 Mar 2024 20:15:00 +0000</pubDate>
      <newznab:attr name="category" value="5040"/>
      <newznab:attr name="size" value="1073741824"/>
    </item>
    <item>
      <title>Show.S02E05.HDTV.x264</title>
      <link>https://nzb.cat/getnzb/bbb.nzb</link>
      <enclosure url="https://nzb.cat/getnzb/bbb.nzb" length="524288000" type="application/x-nzb"/>
    </item>
    <item>
      <title>Show.S02E05.WEB</title>
      <link>https://nzb.cat/getnzb/ccc.nzb</link>
    </item>
    <item>
      <title>Broken.Item</title>
    </item>
  </channel>
</rss>"#;

    /// Torznab items with seeders 3, 50, 12 in document order.
    pub const TORZNAB_RESULTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:torznab="http://torznab.com/schemas/2015/feed">
  <channel>
    <item>
      <title>Show.S02E05.1080p</title>
      <link>https://tracker.example/dl/1.torrent</link>
      <size>2147483648</size>
      <torznab:attr name="seeders" value="3"/>
    </item>
    <item>
      <title>Show.S02E05.720p</title>
      <enclosure url="https://tracker.example/dl/2.torrent" length="1073741824" type="application/x-bittorrent"/>
      <torznab:attr name="seeders" value="50"/>
    </item>
    <item>
      <title>Show.S02.Complete</title>
      <link>https://tracker.example/dl/3.torrent</link>
      <torznab:attr name="seeders" value="12"/>
    </item>
  </channel>
</rss>"#;

    /// Error document for a bad API key.
    pub const AUTH_ERROR: &str =
        r#"<?xml version="1.0" encoding="UTF-8"?><error code="100" description="Incorrect user credentials"/>"#;

    /// An enabled provider with an API key.
    pub fn provider(name: &str, url: &str) -> ProviderRecord {
        let mut record = ProviderRecord::new(name, url);
        record.api_key = "test-key".to_string();
        record.enabled = true;
        record
    }
}
