//! Pipeline templates for `troyops cicd`.
//!
//! Placeholders:
//! - `$${app_name}` - application / image name

/// GitHub Actions workflow: build and push an image, then point the base
/// Kustomization at it and commit so the GitOps controller picks it up.
pub const GITHUB_WORKFLOW_TEMPLATE: &str = r#"name: $${app_name} CI/CD

on:
  push:
    branches: [ main ]
  pull_request:
    branches: [ main ]

jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout
        uses: actions/checkout@v4

      - name: Set up Docker Buildx
        uses: docker/setup-buildx-action@v3

      - name: Log in to Docker Hub
        uses: docker/login-action@v3
        with:
          username: ${{ secrets.DOCKER_HUB_USERNAME }}
          password: ${{ secrets.DOCKER_HUB_ACCESS_TOKEN }}

      - name: Build and push $${app_name}:latest
        uses: docker/build-push-action@v5
        with:
          context: .
          push: ${{ github.event_name == 'push' }}
          tags: ${{ secrets.DOCKER_HUB_USERNAME }}/$${app_name}:latest

  deploy:
    needs: build
    if: github.event_name == 'push' && github.ref == 'refs/heads/main'
    runs-on: ubuntu-latest
    permissions:
      contents: write
    steps:
      - name: Checkout
        uses: actions/checkout@v4

      - name: Deploy $${app_name}:latest
        run: |
          cd kustomize/base
          kustomize edit set image $${app_name}=${{ secrets.DOCKER_HUB_USERNAME }}/$${app_name}:latest

      - name: Commit manifest changes
        run: |
          git config user.name "github-actions[bot]"
          git config user.email "github-actions[bot]@users.noreply.github.com"
          git add kustomize/base
          git diff --cached --quiet || git commit -m "Deploy $${app_name}:latest"
          git push
"#;

/// GitLab CI pipeline with the same build and deploy stages.
pub const GITLAB_CI_TEMPLATE: &str = r#"stages:
  - build
  - deploy

variables:
  DOCKER_TLS_CERTDIR: "/certs"

build:
  stage: build
  image: docker:24
  services:
    - docker:24-dind
  script:
    - echo "$DOCKER_HUB_ACCESS_TOKEN" | docker login -u "$DOCKER_HUB_USERNAME" --password-stdin
    - docker build -t $DOCKER_HUB_USERNAME/$${app_name}:latest .
    - docker push $DOCKER_HUB_USERNAME/$${app_name}:latest

deploy:
  stage: deploy
  image: alpine/k8s:1.30.2
  rules:
    - if: $CI_COMMIT_BRANCH == $CI_DEFAULT_BRANCH
  before_script:
    - apk add --no-cache git
  script:
    - cd kustomize/base
    - kustomize edit set image $${app_name}=$DOCKER_HUB_USERNAME/$${app_name}:latest
    - git add .
    - git diff --cached --quiet || git commit -m "Deploy $${app_name}:latest"
    - git push "https://gitlab-ci-token:$CI_JOB_TOKEN@$CI_SERVER_HOST/$CI_PROJECT_PATH.git" HEAD:$CI_COMMIT_BRANCH
"#;
