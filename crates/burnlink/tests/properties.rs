//! Property tests over the whole service.

use burnlink::{BurnlinkError, CreateOptions};
use burnlink_testkit::generators::{blank_content, invalid_view_limit, CreateParams};
use burnlink_testkit::TestFixture;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exactly_view_limit_reads_succeed(params in any::<CreateParams>(), extra in 0u32..5) {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let fixture = TestFixture::new();
            let id = fixture.service.create(params.to_options()).await.unwrap();

            for n in 1..=params.view_limit {
                let read = fixture.service.read(id.as_str()).await.unwrap();
                prop_assert_eq!(&read.content, &params.content);
                prop_assert_eq!(read.kind, params.kind);
                prop_assert_eq!(read.remaining_views, params.view_limit - n);
                prop_assert_eq!(read.is_last_view, n == params.view_limit);
            }
            for _ in 0..=extra {
                let err = fixture.service.read(id.as_str()).await.unwrap_err();
                prop_assert!(err.is_not_found());
            }
            Ok(())
        });
        outcome?;
    }

    #[test]
    fn prop_invalid_input_never_persists(
        content in blank_content(),
        limit in invalid_view_limit(),
    ) {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let fixture = TestFixture::new();

            let err = fixture.service.create(CreateOptions::new(content)).await.unwrap_err();
            prop_assert!(matches!(err, BurnlinkError::InvalidInput(_)));

            let err = fixture
                .service
                .create(CreateOptions::new("fine").view_limit(limit))
                .await
                .unwrap_err();
            prop_assert!(matches!(err, BurnlinkError::InvalidViewLimit(_)));

            prop_assert_eq!(fixture.stored().await.unwrap(), 0);
            Ok(())
        });
        outcome?;
    }
}
