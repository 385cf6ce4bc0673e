// tests/ordering.rs

//! Build order and inverse dependents over a repository tree

mod common;

use common::RepoFixture;
use slackpick::{
    CachedRequirements, Catalog, DependencyResolver, Error, LiveRequirements, PackageId,
    RepoRequirements, RequirementsProvider,
};

fn names(catalog: &Catalog, ids: &[PackageId]) -> Vec<String> {
    ids.iter().map(|&id| catalog.get(id).name.clone()).collect()
}

fn order(
    catalog: &Catalog,
    requirements: &dyn RequirementsProvider,
    target: &str,
) -> Result<Vec<String>, Error> {
    let resolver = DependencyResolver::new(catalog, requirements);
    let ids = resolver.forward_order(catalog.lookup(target).unwrap())?;
    Ok(names(catalog, &ids))
}

#[test]
fn test_shared_dependency_built_first() {
    let repo = RepoFixture::new();
    repo.add_package("development", "cmake-extras", "1.0", "")
        .add_package("libraries", "libogg", "1.3", "cmake-extras")
        .add_package("libraries", "libvorbis", "1.3", "libogg cmake-extras")
        .add_package("audio", "vorbis-tools", "1.4", "libvorbis libogg %README%");
    let catalog = repo.catalog();

    assert_eq!(
        order(&catalog, &RepoRequirements, "vorbis-tools").unwrap(),
        vec!["cmake-extras", "libogg", "libvorbis"]
    );
}

#[test]
fn test_leaf_has_empty_order() {
    let repo = RepoFixture::new();
    repo.add_package("system", "htop", "3.3", "%README%");
    let catalog = repo.catalog();

    assert!(order(&catalog, &RepoRequirements, "htop").unwrap().is_empty());
}

#[test]
fn test_nested_missing_dependency() {
    let repo = RepoFixture::new();
    repo.add_package("libraries", "libdvdread", "6.1", "libdvdcss")
        .add_package("multimedia", "dvd-player", "1.0", "libdvdread");
    let catalog = repo.catalog();

    match order(&catalog, &RepoRequirements, "dvd-player") {
        Err(Error::MissingDependency(name)) => assert_eq!(name, "libdvdcss"),
        other => panic!("expected missing dependency, got {:?}", other),
    }
}

#[test]
fn test_cycle_in_tree() {
    let repo = RepoFixture::new();
    repo.add_package("python", "python3-a", "1.0", "python3-b")
        .add_package("python", "python3-b", "1.0", "python3-a");
    let catalog = repo.catalog();

    match order(&catalog, &RepoRequirements, "python3-a") {
        Err(Error::CycleDetected(path)) => {
            assert_eq!(path, vec!["python3-a", "python3-b", "python3-a"])
        }
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[test]
fn test_installed_requirements_come_from_refresh() {
    let repo = RepoFixture::new();
    repo.add_package("libraries", "old-dep", "1.0", "")
        .add_package("libraries", "new-dep", "1.0", "")
        .add_package("desktop", "viewer", "2.0", "old-dep")
        .install("viewer-2.0-x86_64-1_SBo");
    let catalog = repo.catalog();

    // The tree changes after the refresh, as after a sync
    repo.add_package("desktop", "viewer", "2.1", "new-dep");

    assert_eq!(order(&catalog, &RepoRequirements, "viewer").unwrap(), vec!["old-dep"]);
    assert_eq!(order(&catalog, &CachedRequirements, "viewer").unwrap(), vec!["old-dep"]);
    assert_eq!(order(&catalog, &LiveRequirements, "viewer").unwrap(), vec!["new-dep"]);
}

#[test]
fn test_not_installed_requirements_read_from_tree() {
    let repo = RepoFixture::new();
    repo.add_package("libraries", "libpng", "1.6", "")
        .add_package("graphics", "imgview", "0.3", "libpng");
    let catalog = repo.catalog();

    // Never refreshed from the tree, so the catalog holds nothing
    assert!(order(&catalog, &CachedRequirements, "imgview").unwrap().is_empty());
    assert_eq!(order(&catalog, &RepoRequirements, "imgview").unwrap(), vec!["libpng"]);
}

#[test]
fn test_inverse_dependents_of_installed_library() {
    let repo = RepoFixture::new();
    repo.add_package("libraries", "libx264", "1.0", "")
        .add_package("multimedia", "ffmpeg", "6.1", "libx264")
        .add_package("multimedia", "mpv", "0.38", "ffmpeg")
        .add_package("multimedia", "obs", "30.0", "ffmpeg libx264")
        .add_package("multimedia", "handbrake", "1.8", "libx264")
        .install("libx264-1.0-x86_64-1_SBo")
        .install("ffmpeg-6.1-x86_64-1_SBo")
        .install("mpv-0.38-x86_64-1_SBo")
        .install("obs-30.0-x86_64-1_SBo");
    let catalog = repo.catalog();

    let resolver = DependencyResolver::new(&catalog, &CachedRequirements);
    let target = catalog.lookup("libx264").unwrap();
    let dependents = resolver.inverse_order(target, &catalog.installed());

    // handbrake is not installed; obs is reached both directly and via ffmpeg
    assert_eq!(names(&catalog, &dependents), vec!["ffmpeg", "mpv", "obs"]);
}

#[test]
fn test_inverse_of_unused_package() {
    let repo = RepoFixture::new();
    repo.add_package("system", "htop", "3.3", "")
        .install("htop-3.3-x86_64-1_SBo");
    let catalog = repo.catalog();

    let resolver = DependencyResolver::new(&catalog, &CachedRequirements);
    let target = catalog.lookup("htop").unwrap();
    assert!(resolver.inverse_order(target, &catalog.installed()).is_empty());
}
