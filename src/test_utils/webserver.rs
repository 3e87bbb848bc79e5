use mockito::{mock, Matcher, Mock};

pub struct MockWebserver {
    mock: Mock,
}

impl MockWebserver {
    pub fn from_json(path: &str, method: &str, json_string: &str) -> Self {
        Self {
            mock: mock(method, path)
                .match_query(Matcher::Any)
                .with_header("content-type", "application/json")
                .with_body(json_string)
                .create(),
        }
    }

    /// Answer requests whose query contains all `query` parameters.
    pub fn from_json_with_query(
        path: &str,
        method: &str,
        query: &[(&str, &str)],
        json_string: &str,
    ) -> Self {
        let query = query
            .iter()
            .map(|(key, value)| Matcher::UrlEncoded(key.to_string(), value.to_string()))
            .collect();

        Self {
            mock: mock(method, path)
                .match_query(Matcher::AllOf(query))
                .with_header("content-type", "application/json")
                .with_body(json_string)
                .create(),
        }
    }

    /// Answer every request with `status` and expect exactly `hits` requests.
    pub fn from_status(path: &str, method: &str, status: usize, hits: usize) -> Self {
        Self {
            mock: mock(method, path)
                .match_query(Matcher::Any)
                .with_status(status)
                .expect(hits)
                .create(),
        }
    }

    pub fn assert(&self) {
        self.mock.assert();
    }

    pub fn webserver_root_url(&self) -> String {
        mockito::server_url()
    }
}
