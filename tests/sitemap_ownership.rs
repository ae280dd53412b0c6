//! Route-to-sitemap ownership across nested namespaces and blocks.

use sitemap_router::{Route, RouteSet};

mod common;

use common::{listed, product_catalog, sorted};

fn owner_name<'a>(set: &'a RouteSet, route: &str) -> Option<&'a str> {
    let route = set
        .find_route_via_name(route)
        .unwrap_or_else(|| panic!("missing route {}", route));
    set.route_owner(route).map(Route::name)
}

#[test]
fn test_product_catalog_sitemaps() {
    let set = product_catalog();

    let cases: [(&str, &[&str]); 5] = [
        ("/sitemap.xml", &["root", "faqs", "faq"]),
        (
            "/products/sitemap.xml",
            &[
                "products_papers",
                "products_paper",
                "products_pencils",
                "products_pencil",
            ],
        ),
        (
            "/products/video/sitemap.xml",
            &[
                "products_video_dvd_players",
                "products_video_dvd_player",
                "products_video_dvd_player_comments",
                "products_video_dvd_player_comment",
                "products_video_accessories",
                "products_video_accessory",
            ],
        ),
        (
            "/products/audio/sitemap.xml",
            &[
                "products_audio_head_phones",
                "products_audio_head_phone",
                "products_audio_speakers",
                "products_audio_speaker",
                "products_audio_accessories",
                "products_audio_accessory",
            ],
        ),
        (
            "/products/video/bluray.xml",
            &["products_video_blu_ray_players", "products_video_blu_ray_player"],
        ),
    ];

    for (key, expected) in cases {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted(listed(&set, key)), sorted(expected), "sitemap {}", key);
    }
}

#[test]
fn test_innermost_block_claims_first() {
    let set = product_catalog();
    assert_eq!(
        owner_name(&set, "products_video_blu_ray_players"),
        Some("products_video_bluray_sitemap")
    );
    assert_eq!(
        owner_name(&set, "products_video_dvd_player_comments"),
        Some("products_video_sitemap_sitemap")
    );
    assert_eq!(
        owner_name(&set, "products_papers"),
        Some("products_sitemap_sitemap")
    );
    assert_eq!(owner_name(&set, "faqs"), Some("sitemap_sitemap"));
}

#[test]
fn test_block_routes_keep_declaration_order() {
    let set = product_catalog();
    assert_eq!(
        listed(&set, "/products/video/sitemap.xml"),
        vec![
            "products_video_dvd_player_comments",
            "products_video_dvd_player_comment",
            "products_video_dvd_players",
            "products_video_dvd_player",
            "products_video_accessories",
            "products_video_accessory",
        ]
    );
}

/// books (bare) → trucks (block) → cars (block)
fn books_trucks_cars() -> RouteSet {
    let mut set = RouteSet::new();
    set.draw(|m| {
        m.sitemap("sitemap");
        m.resources("chicks");

        m.namespace("books", |m| {
            m.sitemap("sitemap");
            m.resources("drums");

            m.namespace("trucks", |m| {
                m.sitemap_with("sitemap", Default::default(), |m| {
                    m.resources("wheels");
                    m.namespace("cars", |m| {
                        m.sitemap_with("sitemap", Default::default(), |m| {
                            m.resources("basses");
                        });
                    });
                });
                m.resources("horns");
            });
        });
    });
    set
}

#[test]
fn test_nearest_enclosing_sitemap_owns() {
    let set = books_trucks_cars();

    assert_eq!(
        owner_name(&set, "books_trucks_cars_basses"),
        Some("books_trucks_cars_sitemap_sitemap")
    );
    assert_eq!(
        owner_name(&set, "books_trucks_wheels"),
        Some("books_trucks_sitemap_sitemap")
    );
    // Declared outside the trucks block: the bare books sitemap takes it.
    assert_eq!(
        owner_name(&set, "books_trucks_horns"),
        Some("books_sitemap_sitemap")
    );
    assert_eq!(owner_name(&set, "books_drums"), Some("books_sitemap_sitemap"));
    assert_eq!(owner_name(&set, "chicks"), Some("sitemap_sitemap"));

    let basses = set.find_route_via_name("books_trucks_cars_basses").unwrap();
    let cars = set
        .find_sitemap_route("/books/trucks/cars/sitemap.xml")
        .unwrap();
    assert_eq!(basses.owning_sitemap_id(), Some(cars.id()));
}

#[test]
fn test_bare_and_block_listings() {
    let set = books_trucks_cars();

    assert_eq!(listed(&set, "/sitemap.xml"), vec!["chicks", "chick"]);
    assert_eq!(
        listed(&set, "/books/sitemap.xml"),
        vec![
            "books_drums",
            "books_drum",
            "books_trucks_horns",
            "books_trucks_horn",
        ]
    );
    assert_eq!(
        listed(&set, "/books/trucks/sitemap.xml"),
        vec!["books_trucks_wheels", "books_trucks_wheel"]
    );
    assert_eq!(
        listed(&set, "books_trucks_cars_sitemap"),
        vec!["books_trucks_cars_basses", "books_trucks_cars_bass"]
    );
}

#[test]
fn test_deepest_bare_owner_wins() {
    let mut set = RouteSet::new();
    set.draw(|m| {
        m.sitemap("sitemap");
        m.namespace("books", |m| {
            m.sitemap("sitemap");
            m.namespace("trucks", |m| {
                m.sitemap("sitemap");
                m.resources("wheels");
            });
            m.resources("drums");
        });
    });

    assert_eq!(
        owner_name(&set, "books_trucks_wheels"),
        Some("books_trucks_sitemap_sitemap")
    );
    assert_eq!(owner_name(&set, "books_drums"), Some("books_sitemap_sitemap"));
    assert!(listed(&set, "/sitemap.xml").is_empty());
}

#[test]
fn test_route_without_any_sitemap() {
    let mut set = RouteSet::new();
    set.draw(|m| {
        m.namespace("books", |m| {
            m.sitemap_with("sitemap", Default::default(), |_| {});
        });
        m.resources("faqs");
    });

    // Only a block sitemap exists and it never claimed faqs.
    assert_eq!(owner_name(&set, "faqs"), None);
    assert!(listed(&set, "/books/sitemap.xml").is_empty());
}

#[test]
fn test_lookup_misses() {
    let set = books_trucks_cars();
    assert!(set.find_sitemap_route("/nowhere.xml").is_none());
    assert!(set.find_route_via_name("nowhere").is_none());
}
